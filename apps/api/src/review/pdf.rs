use crate::errors::AppError;

/// Characters of extracted text echoed back as `text_preview`.
const PREVIEW_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub full_text: String,
    pub preview: String,
}

impl ExtractedText {
    pub fn from_text(text: &str) -> Self {
        let full_text = text.trim().to_string();
        let preview = full_text.chars().take(PREVIEW_CHARS).collect();
        Self { full_text, preview }
    }
}

/// Extracts the text layer of an in-memory PDF on the blocking pool.
/// Parser panics on malformed input are reported as parse failures.
pub async fn extract_text(bytes: Vec<u8>) -> Result<ExtractedText, AppError> {
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::PdfParseFailed("PDF parser aborted on malformed input".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}"))
            }
        })?
        .map_err(|e| AppError::PdfParseFailed(e.to_string()))?;

    Ok(ExtractedText::from_text(&extracted))
}
