//! Product CRUD and catalogue handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};

use artisan_collective_core::{BlobId, ProductId};

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{NewBlob, NewProduct, ProductListing, ProductUpdate, ProductView};
use crate::state::AppState;

use super::{
    success_message,
    upload::{SubmittedForm, UploadedFile},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(all_products).post(add_product))
        .route(
            "/api/products/{id}",
            put(update_product).delete(delete_product),
        )
        .layer(DefaultBodyLimit::max(super::MAX_UPLOAD_BYTES))
        .route("/api/my-products", get(my_products))
}

fn product_not_found() -> AppError {
    AppError::NotFound(
        "Product not found or you do not have permission to modify it.".to_owned(),
    )
}

fn parse_price(raw: Option<&str>) -> Result<f64, AppError> {
    let invalid = || AppError::Validation("Invalid price.".to_owned());
    let price: f64 = raw
        .ok_or_else(invalid)?
        .trim()
        .parse()
        .map_err(|_| invalid())?;
    if !price.is_finite() || price < 0.0 {
        return Err(invalid());
    }
    Ok(price)
}

/// Store every uploaded product image and return the blob IDs in
/// submission order.
async fn store_images(
    state: &AppState,
    files: Vec<UploadedFile>,
) -> Result<Vec<BlobId>, AppError> {
    let mut ids = Vec::with_capacity(files.len());
    for file in files {
        if file.filename.is_empty() {
            continue;
        }
        let id = state
            .blobs()
            .put(NewBlob {
                filename: format!("prod_{}", file.filename),
                content_type: file.content_type,
                data: file.data,
            })
            .await?;
        ids.push(id);
    }
    Ok(ids)
}

async fn delete_blobs(state: &AppState, ids: &[BlobId]) -> Result<(), AppError> {
    for id in ids {
        state.blobs().delete(*id).await?;
    }
    Ok(())
}

/// Create a product from a multipart form with optional `productImages`
/// file parts.
async fn add_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = SubmittedForm::read(multipart).await?;

    // Only the price is validated; an absent name is stored empty
    let price = parse_price(form.text("price"))?;
    let image_ids = store_images(&state, form.take_files("productImages")).await?;

    state
        .products()
        .insert(NewProduct {
            artisan_id: user.id,
            name: form.text_or_empty("name"),
            description: form.text_or_empty("description"),
            price,
            image_ids,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(success_message("Product uploaded!")),
    ))
}

/// Replace a product's fields. New images, when submitted, replace the
/// whole existing set; the old blobs are deleted first so a crash
/// between the two steps orphans nothing the record still points at.
async fn update_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let id = ProductId::parse(&id).map_err(|_| product_not_found())?;
    let existing = state
        .products()
        .get_owned(id, user.id)
        .await?
        .ok_or_else(product_not_found)?;

    let mut form = SubmittedForm::read(multipart).await?;

    let price = parse_price(form.text("price"))?;

    let new_files = form.take_files("productImages");
    let image_ids = if new_files.is_empty() {
        None
    } else {
        delete_blobs(&state, &existing.image_ids).await?;
        Some(store_images(&state, new_files).await?)
    };

    state
        .products()
        .update(
            id,
            ProductUpdate {
                name: form.text_or_empty("name"),
                description: form.text_or_empty("description"),
                price,
                image_ids,
            },
        )
        .await
        .map_err(|e| match e {
            crate::store::StoreError::NotFound => product_not_found(),
            other => AppError::Store(other),
        })?;

    Ok(Json(success_message("Product updated successfully.")))
}

/// Delete a product and its image blobs. Blobs go first; a leftover
/// record without media beats unreachable orphaned media.
async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = ProductId::parse(&id).map_err(|_| product_not_found())?;
    let existing = state
        .products()
        .get_owned(id, user.id)
        .await?
        .ok_or_else(product_not_found)?;

    delete_blobs(&state, &existing.image_ids).await?;
    state.products().delete(id).await?;

    Ok(Json(success_message("Product deleted successfully.")))
}

/// The caller's own products.
async fn my_products(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let products = state.products().list_by_artisan(user.id).await?;
    let views: Vec<ProductView> = products.iter().map(ProductView::from).collect();
    Ok(Json(views))
}

/// Public catalogue: every product, enriched with the owner's shop name
/// and contact number.
async fn all_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.products().list_all().await?;

    let mut listings = Vec::with_capacity(products.len());
    for product in products {
        let owner = state.artisans().get(product.artisan_id).await?;
        let (shopname, contact_number) = owner.map_or_else(
            || ("N/A".to_owned(), "N/A".to_owned()),
            |a| (a.shopname, a.contact_number),
        );
        listings.push(ProductListing {
            product: ProductView::from(product),
            shopname,
            contact_number,
        });
    }

    Ok(Json(listings))
}
