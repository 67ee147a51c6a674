use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use review_client::models::{ReviewResponse, ReviewResult, Submission};
use review_client::validator::{MAX_FILE_SIZE, PDF_MEDIA_TYPE};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::review::pdf::{extract_text, ExtractedText};
use crate::review::reviewer::Reviewer;
use crate::state::AppState;

/// Multipart field carrying the document.
const FILE_FIELD: &str = "file";
const DEFAULT_FILE_NAME: &str = "paper.pdf";

#[derive(Debug)]
struct Upload {
    file_name: String,
    data: Vec<u8>,
}

/// POST /api/review
pub async fn handle_review(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ReviewResponse>, AppError> {
    let upload = read_upload(&mut multipart).await?;
    info!(
        "Received {} ({} bytes) for review",
        upload.file_name,
        upload.data.len()
    );

    let file_size = upload.data.len() as u64;
    let extracted = extract_text(upload.data).await?;
    let response =
        build_review(&upload.file_name, file_size, extracted, state.reviewer.as_ref()).await?;

    info!(
        "Review {} generated for {}",
        response.review_result.review_result_id, response.submission.submission_id
    );
    Ok(Json(response))
}

/// Finds the `file` part and checks its declared type and size.
async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        if content_type.as_deref() != Some(PDF_MEDIA_TYPE) {
            return Err(AppError::InvalidFileType { content_type });
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let data = field.bytes().await.map_err(multipart_error)?;
        if data.len() as u64 > MAX_FILE_SIZE {
            return Err(AppError::FileTooLarge {
                size: Some(data.len()),
            });
        }

        return Ok(Upload {
            file_name,
            data: data.to_vec(),
        });
    }

    Err(AppError::MissingFile)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { size: None }
    } else {
        AppError::InvalidMultipart(e.body_text())
    }
}

/// Runs the reviewer over extracted text and assembles the response body.
pub async fn build_review(
    file_name: &str,
    file_size: u64,
    extracted: ExtractedText,
    reviewer: &dyn Reviewer,
) -> Result<ReviewResponse, AppError> {
    if extracted.full_text.is_empty() {
        return Err(AppError::PdfEmptyText);
    }

    let created_at = Utc::now().to_rfc3339();
    let review = reviewer.review(&extracted.full_text).await?;

    let submission_id = make_id("sub");
    Ok(ReviewResponse {
        submission: Submission {
            submission_id: submission_id.clone(),
            file_name: file_name.to_string(),
            file_size,
            created_at,
            text_preview: extracted.preview,
        },
        review_result: ReviewResult {
            review_result_id: make_id("rev"),
            submission_id,
            scores: review.scores,
            reviews: review.reviews,
            generated_at: Utc::now().to_rfc3339(),
        },
    })
}

/// `{prefix}_YYYYmmdd_HHMMSS_xxxx`, UTC.
fn make_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{prefix}_{}_{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        &suffix[..4]
    )
}
