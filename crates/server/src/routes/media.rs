//! Media streaming handlers.
//!
//! Blobs are streamed chunk by chunk rather than buffered into one
//! contiguous body; chunks are already in memory after the store read,
//! so this bounds the response machinery, not the read.

use std::convert::Infallible;

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
    routing::get,
};
use bytes::Bytes;

use artisan_collective_core::BlobId;

use crate::error::AppError;
use crate::models::Blob;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/video/{id}", get(get_video))
        .route("/image/{id}", get(get_image))
}

/// Stream a profile video. Always served as `video/mp4`.
async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let blob = fetch_blob(&state, &id, "Video not found.").await?;
    stream_blob(blob, Some("video/mp4"))
}

/// Stream an image with its stored content type.
async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let blob = fetch_blob(&state, &id, "Image not found.").await?;
    stream_blob(blob, None)
}

async fn fetch_blob(state: &AppState, raw_id: &str, missing: &str) -> Result<Blob, AppError> {
    let id = BlobId::parse(raw_id).map_err(|_| AppError::NotFound(missing.to_owned()))?;
    state
        .blobs()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(missing.to_owned()))
}

fn stream_blob(blob: Blob, content_type_override: Option<&str>) -> Result<Response, AppError> {
    let content_type = content_type_override.map_or_else(
        || {
            if blob.content_type.is_empty() {
                "application/octet-stream".to_owned()
            } else {
                blob.content_type.clone()
            }
        },
        str::to_owned,
    );
    let length = blob.length;

    let stream = futures::stream::iter(blob.chunks.into_iter().map(Ok::<Bytes, Infallible>));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, length)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("response build failed: {e}")))
}
