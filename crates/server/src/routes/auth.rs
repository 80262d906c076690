//! Signup, login, and logout handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;
use tower_sessions::Session;

use artisan_collective_core::BlobId;

use crate::error::AppError;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, NewBlob};
use crate::services::{AuthService, Signup};
use crate::state::AppState;

use super::{
    success_message,
    upload::{SubmittedForm, UploadedFile},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/signup", post(signup))
        // The limit layer only wraps the upload route above it
        .layer(DefaultBodyLimit::max(super::MAX_UPLOAD_BYTES))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
}

/// Register a new artisan from a multipart form.
///
/// Optional `video` and `profileImage` file parts are stored before the
/// account record; a failed signup can therefore leave uploaded blobs
/// behind, which nothing references and nothing serves.
async fn signup(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = SubmittedForm::read(multipart).await?;

    let username = form.text_or_empty("username");
    let password = form.text_or_empty("password");
    let fullname = form.text_or_empty("name");
    if username.is_empty() || password.is_empty() || fullname.is_empty() {
        return Err(AppError::Validation("Missing required fields.".to_owned()));
    }

    let video_id = store_first_file(
        &state,
        form.take_files("video"),
        &format!("{username}_video"),
    )
    .await?;
    let profile_image_id = store_first_file(
        &state,
        form.take_files("profileImage"),
        &format!("{username}_profile_pic"),
    )
    .await?;

    let auth = AuthService::new(state.artisans());
    auth.signup(Signup {
        username,
        password,
        fullname,
        shopname: form.text_or_empty("shop"),
        address: form.text_or_empty("address"),
        geolocation: form.text_or_empty("geo"),
        story: form.text_or_empty("story"),
        video_id,
        profile_image_id,
        contact_number: form.text_or_empty("contactNumber"),
    })
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(success_message("Signup successful! Please log in.")),
    ))
}

/// Store the first submitted file under a derived filename, ignoring
/// nameless blank form inputs.
async fn store_first_file(
    state: &AppState,
    mut files: Vec<UploadedFile>,
    stored_name: &str,
) -> Result<Option<BlobId>, AppError> {
    let Some(file) = files.drain(..).next() else {
        return Ok(None);
    };
    // A named zero-byte file is a real upload; only nameless parts are
    // blank form inputs
    if file.filename.is_empty() {
        return Ok(None);
    }

    let id = state
        .blobs()
        .put(NewBlob {
            filename: stored_name.to_owned(),
            content_type: file.content_type,
            data: file.data,
        })
        .await?;
    Ok(Some(id))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Verify credentials and establish a session.
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let auth = AuthService::new(state.artisans());
    let artisan = auth.login(&request.username, &request.password).await?;

    set_current_user(
        &session,
        &CurrentUser {
            id: artisan.id,
            username: artisan.username,
        },
    )
    .await
    .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;

    Ok(Json(success_message("Login successful!")))
}

/// Clear the caller's session. Safe to call without one.
async fn logout(session: Session) -> Result<impl IntoResponse, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session flush failed: {e}")))?;

    Ok(Json(success_message("Logged out.")))
}
