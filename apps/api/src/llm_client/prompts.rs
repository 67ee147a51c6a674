/// System prompt that pins the reviewer persona and enforces JSON-only output.
pub const REVIEW_SYSTEM: &str =
    "You are an expert CS conference reviewer. Respond ONLY with valid JSON.";

const REVIEW_INSTRUCTIONS: &str = "\
You are an experienced reviewer for top-tier computer science conferences.

Given the full paper text below, produce a structured review with STRICT JSON output.
Requirements:
1. Provide four scores (0.0 to 5.0, floating point) for dimensions:
   - novelty
   - technical_quality
   - clarity
   - significance
2. Provide four review comments, labeled reviewer_1 to reviewer_4, each focusing on different aspects.
3. Return ONLY valid JSON. No extra text, no comments, no Markdown.

Paper content (may be long):
";

const REVIEW_OUTPUT_SHAPE: &str = r#"
Return JSON with EXACT keys:

{
  "scores": [
    { "dimension": "novelty", "value": 4.0 },
    { "dimension": "technical_quality", "value": 3.5 },
    { "dimension": "clarity", "value": 4.0 },
    { "dimension": "significance", "value": 3.5 }
  ],
  "reviews": [
    { "reviewer_id": "reviewer_1", "text": "..." },
    { "reviewer_id": "reviewer_2", "text": "..." },
    { "reviewer_id": "reviewer_3", "text": "..." },
    { "reviewer_id": "reviewer_4", "text": "..." }
  ]
}
"#;

pub fn build_review_prompt(paper_text: &str) -> String {
    format!("{REVIEW_INSTRUCTIONS}\n{paper_text}\n\n{REVIEW_OUTPUT_SHAPE}")
}
