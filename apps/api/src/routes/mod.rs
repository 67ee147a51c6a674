pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use review_client::validator::MAX_FILE_SIZE;

use crate::review::handlers;
use crate::state::AppState;

/// Room above the file limit for multipart framing, so an oversize file is
/// still read far enough to be answered with FILE_TOO_LARGE.
const BODY_LIMIT: usize = (MAX_FILE_SIZE as usize) * 2;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(health::ping_handler))
        .route("/api/review", post(handlers::handle_review))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
