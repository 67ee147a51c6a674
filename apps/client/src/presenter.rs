use serde::Serialize;

use crate::models::{ReviewResult, Score};

pub const SCORE_SCALE_SUFFIX: &str = "/ 5.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRow {
    pub dimension: String,
    pub value_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewRow {
    pub header: String,
    pub body: String,
}

/// What the result view draws, in server order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub scores: Vec<ScoreRow>,
    pub reviews: Vec<ReviewRow>,
}

pub fn present(result: &ReviewResult) -> DisplayModel {
    DisplayModel {
        scores: result.scores.iter().map(score_row).collect(),
        reviews: result
            .reviews
            .iter()
            .map(|review| ReviewRow {
                header: review.reviewer_id.clone(),
                body: review.text.clone(),
            })
            .collect(),
    }
}

fn score_row(score: &Score) -> ScoreRow {
    ScoreRow {
        dimension: score.dimension.clone(),
        value_text: format_score(score.value),
    }
}

/// One fractional digit, halves rounded away from zero: 3.25 -> "3.3 / 5.0".
pub fn format_score(value: f64) -> String {
    // `{:.1}` alone rounds exact halves to even.
    let rounded = (value * 10.0).round() / 10.0;
    // -0.04 rounds to -0.0, which would print with a sign.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.1} {SCORE_SCALE_SUFFIX}")
}

/// Plain-text rendering for hosts without a widget tree.
pub fn render_text(model: &DisplayModel) -> Vec<String> {
    model
        .scores
        .iter()
        .map(|row| format!("{} {}", row.dimension, row.value_text))
        .chain(
            model
                .reviews
                .iter()
                .map(|row| format!("{}: {}", row.header, row.body)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Review;

    fn result(scores: &[(&str, f64)], reviews: &[(&str, &str)]) -> ReviewResult {
        ReviewResult {
            review_result_id: "rev_1".into(),
            submission_id: "sub_1".into(),
            scores: scores
                .iter()
                .map(|(d, v)| Score {
                    dimension: d.to_string(),
                    value: *v,
                })
                .collect(),
            reviews: reviews
                .iter()
                .map(|(r, t)| Review {
                    reviewer_id: r.to_string(),
                    text: t.to_string(),
                })
                .collect(),
            generated_at: "2025-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_format_whole_number() {
        assert_eq!(format_score(4.0), "4.0 / 5.0");
    }

    #[test]
    fn test_format_rounds_half_up() {
        assert_eq!(format_score(3.25), "3.3 / 5.0");
        assert_eq!(format_score(0.05), "0.1 / 5.0");
    }

    #[test]
    fn test_format_does_not_clamp() {
        assert_eq!(format_score(7.0), "7.0 / 5.0");
        assert_eq!(format_score(-1.0), "-1.0 / 5.0");
    }

    #[test]
    fn test_format_small_negative_is_unsigned_zero() {
        assert_eq!(format_score(-0.04), "0.0 / 5.0");
        assert_eq!(format_score(-0.0), "0.0 / 5.0");
        assert_eq!(format_score(-0.06), "-0.1 / 5.0");
    }

    #[test]
    fn test_present_keeps_server_order() {
        let model = present(&result(
            &[("novelty", 4.5), ("clarity", 3.0), ("significance", 2.75)],
            &[("reviewer_2", "Second."), ("reviewer_1", "First.")],
        ));

        let dims: Vec<_> = model.scores.iter().map(|r| r.dimension.as_str()).collect();
        assert_eq!(dims, ["novelty", "clarity", "significance"]);
        assert_eq!(model.scores[2].value_text, "2.8 / 5.0");
        assert_eq!(model.reviews[0].header, "reviewer_2");
        assert_eq!(model.reviews[1].body, "First.");
    }

    #[test]
    fn test_present_empty_result() {
        let model = present(&result(&[], &[]));
        assert!(model.scores.is_empty());
        assert!(model.reviews.is_empty());
        assert!(render_text(&model).is_empty());
    }

    #[test]
    fn test_render_text_lines() {
        let model = present(&result(
            &[("novelty", 4.5), ("clarity", 3.0)],
            &[("reviewer_1", "Solid contribution.")],
        ));
        assert_eq!(
            render_text(&model),
            [
                "novelty 4.5 / 5.0",
                "clarity 3.0 / 5.0",
                "reviewer_1: Solid contribution.",
            ]
        );
    }
}
