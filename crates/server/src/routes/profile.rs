//! Profile and rating handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use artisan_collective_core::ArtisanId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{ArtisanView, ProfileUpdate, round2};
use crate::state::AppState;

use super::success_message;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile).post(update_profile))
        .route("/api/artisans/{id}/rate", post(rate_artisan))
}

/// The caller's own profile.
async fn get_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let artisan = state
        .artisans()
        .get(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found.".to_owned()))?;

    Ok(Json(ArtisanView::from(artisan)))
}

/// Whole-field profile update. Omitted fields arrive as empty strings
/// and overwrite the stored values.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileUpdateRequest {
    #[serde(default)]
    fullname: String,
    #[serde(default)]
    shopname: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    story: String,
    #[serde(default)]
    contact_number: String,
}

async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .artisans()
        .update_profile(
            user.id,
            ProfileUpdate {
                fullname: request.fullname,
                shopname: request.shopname,
                address: request.address,
                story: request.story,
                contact_number: request.contact_number,
            },
        )
        .await
        .map_err(|e| match e {
            crate::store::StoreError::NotFound => {
                AppError::NotFound("User not found.".to_owned())
            }
            other => AppError::Store(other),
        })?;

    Ok(Json(success_message("Profile updated successfully.")))
}

/// Submit one rating for an artisan. Unauthenticated; any visitor may
/// rate.
async fn rate_artisan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, AppError> {
    let id = ArtisanId::parse(&id)
        .map_err(|_| AppError::NotFound("Artisan not found.".to_owned()))?;

    // Accept a JSON number or a numeric string, as clients send both
    let rating = match body.get("rating") {
        Some(v) => v
            .as_f64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<f64>().ok())),
        None => None,
    }
    .ok_or_else(|| AppError::Validation("Invalid rating value.".to_owned()))?;

    if !(1.0..=5.0).contains(&rating) {
        return Err(AppError::Validation(
            "Rating must be between 1 and 5.".to_owned(),
        ));
    }

    let summary = state
        .artisans()
        .add_rating(id, rating)
        .await?
        .ok_or_else(|| AppError::NotFound("Artisan not found.".to_owned()))?;

    Ok(Json(json!({
        "status": "success",
        "message": "Rating submitted.",
        "newRating": round2(summary.average()),
        "ratingCount": summary.rating_count,
    })))
}
