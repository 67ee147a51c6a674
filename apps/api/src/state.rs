use std::sync::Arc;

use crate::review::reviewer::Reviewer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable review backend. Default: `DeepSeekReviewer`; tests swap in stubs.
    pub reviewer: Arc<dyn Reviewer>,
}
