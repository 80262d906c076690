//! API route handlers.

pub mod artisans;
pub mod auth;
pub mod media;
pub mod products;
pub mod profile;
pub mod upload;

use axum::Router;
use serde_json::{Value, json};

use crate::state::AppState;

/// Build the full API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(profile::router())
        .merge(products::router())
        .merge(artisans::router())
        .merge(media::router())
}

/// Request-body cap for the multipart upload routes.
///
/// Axum's 2 MB default would reject any realistic profile video; the
/// blob store chunks uploads, so the cap only bounds per-request memory.
pub(crate) const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Standard success envelope used by mutation endpoints.
pub(crate) fn success_message(message: &str) -> Value {
    json!({ "status": "success", "message": message })
}
