/// Review service client, the only place that talks to `POST /api/review`.
///
/// One attempt per call: no retries and no timeout. The cancellation token is
/// honoured at the single suspension point.
use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::SubmitError;
use crate::models::{ErrorEnvelope, ReviewResponse};
use crate::validator::{CandidateFile, FileSource, PDF_MEDIA_TYPE};

/// Multipart field the service reads the document from.
pub const FILE_FIELD: &str = "file";

/// The upload seam. `ReviewSession` holds an `Arc<dyn ReviewService>` so hosts
/// and tests can swap the transport.
#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn submit_review(
        &self,
        file: &CandidateFile,
        cancel: &CancellationToken,
    ) -> Result<ReviewResponse, SubmitError>;
}

#[derive(Clone)]
pub struct ReviewServiceClient {
    client: Client,
    review_url: String,
}

impl ReviewServiceClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Client for the process-wide configuration. The base is read from the
    /// environment on the first call and reused afterwards.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self::new(ClientConfig::global()?))
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            review_url: config.review_url(),
        }
    }

    pub fn review_url(&self) -> &str {
        &self.review_url
    }

    async fn send(&self, file: &CandidateFile) -> Result<ReviewResponse, SubmitError> {
        let data = match &file.source {
            FileSource::Memory(bytes) => bytes.to_vec(),
            FileSource::Path(path) => tokio::fs::read(path).await?,
        };

        let form = multipart::Form::new().part(FILE_FIELD, pdf_part(&file.name, data)?);

        info!(
            "Uploading {} ({} bytes) to {}",
            file.name, file.size, self.review_url
        );

        let response = self
            .client
            .post(&self.review_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("Review service unreachable: {e}");
                SubmitError::Network(e)
            })?;

        let status = response.status();
        // A body that cannot be read or parsed counts as an absent payload.
        let payload = match response.text().await {
            Ok(body) => parse_payload(&body),
            Err(e) => {
                debug!("Failed to read response body: {e}");
                None
            }
        };

        if !status.is_success() {
            let message = api_error_message(payload.as_ref(), status);
            warn!("Review service returned {}: {}", status, message);
            return Err(SubmitError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let payload = payload.ok_or(SubmitError::Parse)?;
        let review: ReviewResponse = serde_json::from_value(payload).map_err(|e| {
            warn!("Unexpected review response shape: {e}");
            SubmitError::Parse
        })?;

        debug!(
            "Review received: submission={}, scores={}, reviews={}",
            review.submission.submission_id,
            review.review_result.scores.len(),
            review.review_result.reviews.len()
        );

        Ok(review)
    }
}

#[async_trait]
impl ReviewService for ReviewServiceClient {
    async fn submit_review(
        &self,
        file: &CandidateFile,
        cancel: &CancellationToken,
    ) -> Result<ReviewResponse, SubmitError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SubmitError::Cancelled),
            result = self.send(file) => result,
        }
    }
}

/// The `file` part. A failure here is local and never reported as a network error.
fn pdf_part(file_name: &str, data: Vec<u8>) -> Result<multipart::Part, SubmitError> {
    multipart::Part::bytes(data)
        .file_name(file_name.to_string())
        .mime_str(PDF_MEDIA_TYPE)
        .map_err(|e| {
            warn!("Could not build upload part for {file_name}: {e}");
            SubmitError::Parse
        })
}

fn parse_payload(body: &str) -> Option<Value> {
    serde_json::from_str(body).ok()
}

/// Picks the user-facing message for a non-success response: the envelope's
/// `error.message`, then the status reason phrase, then a generated fallback.
/// The first non-empty candidate wins.
pub fn api_error_message(payload: Option<&Value>, status: StatusCode) -> String {
    let from_payload = payload
        .and_then(|p| serde_json::from_value::<ErrorEnvelope>(p.clone()).ok())
        .map(|envelope| envelope.error.message)
        .or_else(|| {
            // Tolerate envelopes that carry a message but miss other fields.
            payload
                .and_then(|p| p.pointer("/error/message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

    [
        from_payload,
        status.canonical_reason().map(str::to_string),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| !candidate.trim().is_empty())
    .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()))
}
