//! Public artisan directory handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;

use artisan_collective_core::ArtisanId;

use crate::error::AppError;
use crate::models::{ArtisanView, ProductView};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/artisans", get(list_artisans))
        .route("/api/artisan-profile/{id}", get(artisan_profile))
}

/// Every artisan, without credentials.
async fn list_artisans(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let artisans = state.artisans().list().await?;
    let views: Vec<ArtisanView> = artisans.iter().map(ArtisanView::from).collect();
    Ok(Json(views))
}

/// A product on an artisan's public page, annotated with the shop name.
#[derive(Debug, Serialize)]
struct AnnotatedProduct {
    #[serde(flatten)]
    product: ProductView,
    shopname: String,
}

#[derive(Debug, Serialize)]
struct ArtisanProfileResponse {
    artisan: ArtisanView,
    products: Vec<AnnotatedProduct>,
}

/// An artisan's public page: their profile plus their products.
async fn artisan_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id =
        ArtisanId::parse(&id).map_err(|_| AppError::NotFound("Artisan not found.".to_owned()))?;
    let artisan = state
        .artisans()
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artisan not found.".to_owned()))?;

    let products = state.products().list_by_artisan(id).await?;
    let products = products
        .into_iter()
        .map(|p| AnnotatedProduct {
            product: ProductView::from(p),
            shopname: artisan.shopname.clone(),
        })
        .collect();

    Ok(Json(ArtisanProfileResponse {
        artisan: ArtisanView::from(artisan),
        products,
    }))
}
