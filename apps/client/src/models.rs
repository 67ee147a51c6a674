use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One uploaded document as recorded by the review service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub submission_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub created_at: String,
    pub text_preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub dimension: String,
    pub value: f64, // 0.0 – 5.0, not enforced client-side
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub reviewer_id: String,
    pub text: String,
}

/// Scores and reviewer comments generated for a single submission.
/// Both sequences keep the order the service produced them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub review_result_id: String,
    pub submission_id: String,
    pub scores: Vec<Score>,
    pub reviews: Vec<Review>,
    pub generated_at: String,
}

/// Success body of `POST /api/review`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub submission: Submission,
    pub review_result: ReviewResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Error body of `POST /api/review`: `{ "error": { code, message, details? } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_review_response_deserializes_wire_shape() {
        let body = json!({
            "submission": {
                "submission_id": "sub_20250101_120000_ab12",
                "file_name": "paper.pdf",
                "file_size": 5_000_000,
                "created_at": "2025-01-01T12:00:00+00:00",
                "text_preview": "Abstract. We study..."
            },
            "review_result": {
                "review_result_id": "rev_20250101_120000_cd34",
                "submission_id": "sub_20250101_120000_ab12",
                "scores": [
                    { "dimension": "novelty", "value": 4.5 },
                    { "dimension": "clarity", "value": 3 }
                ],
                "reviews": [{ "reviewer_id": "reviewer_1", "text": "Solid contribution." }],
                "generated_at": "2025-01-01T12:00:05+00:00"
            }
        });

        let parsed: ReviewResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.submission.file_size, 5_000_000);
        assert_eq!(parsed.review_result.scores[1].value, 3.0);
        assert_eq!(parsed.review_result.reviews[0].reviewer_id, "reviewer_1");
    }

    #[test]
    fn test_error_envelope_details_optional() {
        let parsed: ErrorEnvelope =
            serde_json::from_value(json!({ "error": { "code": "X", "message": "boom" } }))
                .unwrap();
        assert_eq!(parsed.error.details, None);

        let out = serde_json::to_value(&parsed).unwrap();
        assert!(out["error"].get("details").is_none());
    }
}
