use thiserror::Error;

use crate::validator::MAX_FILE_SIZE_MB;

/// Fixed hint shown when no response could be obtained from the service.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the review service. Please check your connection and try again.";

/// Shown for a success status whose body is not a review response.
pub const PARSE_ERROR_MESSAGE: &str = "The review service returned an unexpected response.";

/// Rejections raised before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Only PDF files are supported.")]
    UnsupportedType { content_type: String },

    #[error("File exceeds the {}MB size limit.", MAX_FILE_SIZE_MB)]
    TooLarge { size: u64 },
}

/// Failures of a single upload attempt. The `Display` text is what the user sees.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{}", NETWORK_ERROR_MESSAGE)]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{}", PARSE_ERROR_MESSAGE)]
    Parse,

    #[error("Could not read the selected file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("The upload was cancelled.")]
    Cancelled,
}

impl SubmitError {
    /// The single message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
