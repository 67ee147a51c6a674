//! Review backends: turn extracted paper text into scores and reviewer
//! comments. `AppState` holds an `Arc<dyn Reviewer>`, swapped in tests.

use async_trait::async_trait;
use review_client::models::{Review, Score};
use serde_json::Value;
use tracing::debug;

use crate::llm_client::{LlmClient, LlmError};

/// Scores and reviews as returned by a backend, already normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct PaperReview {
    pub scores: Vec<Score>,
    pub reviews: Vec<Review>,
}

#[async_trait]
pub trait Reviewer: Send + Sync {
    async fn review(&self, paper_text: &str) -> Result<PaperReview, LlmError>;
}

/// DeepSeek chat-completions backend.
pub struct DeepSeekReviewer(pub LlmClient);

#[async_trait]
impl Reviewer for DeepSeekReviewer {
    async fn review(&self, paper_text: &str) -> Result<PaperReview, LlmError> {
        let raw = self.0.review_json(paper_text).await?;
        Ok(normalize_review(&raw))
    }
}

/// Cleans up model output:
/// - scores with a blank dimension are dropped; unreadable values become 0.0
/// - reviews with blank text are dropped; a blank reviewer id becomes "reviewer"
pub fn normalize_review(raw: &Value) -> PaperReview {
    let items = |key: &str| {
        raw.get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    };

    let scores: Vec<Score> = items("scores")
        .iter()
        .filter_map(|item| {
            let dimension = text_field(item, "dimension");
            if dimension.is_empty() {
                return None;
            }
            Some(Score {
                dimension,
                value: number_field(item, "value"),
            })
        })
        .collect();

    let reviews: Vec<Review> = items("reviews")
        .iter()
        .filter_map(|item| {
            let text = text_field(item, "text");
            if text.is_empty() {
                return None;
            }
            let reviewer_id = text_field(item, "reviewer_id");
            Some(Review {
                reviewer_id: if reviewer_id.is_empty() {
                    "reviewer".to_string()
                } else {
                    reviewer_id
                },
                text,
            })
        })
        .collect();

    debug!(
        "Normalized review: {} scores, {} reviews",
        scores.len(),
        reviews.len()
    );

    PaperReview { scores, reviews }
}

fn text_field(item: &Value, key: &str) -> String {
    match item.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn number_field(item: &Value, key: &str) -> f64 {
    match item.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
