//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use artisan_collective_core::{ArtisanId, BlobId, ProductId};

/// A product listed by an artisan (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Owning artisan.
    pub artisan_id: ArtisanId,
    /// Product name.
    pub name: String,
    /// Product description.
    pub description: String,
    /// Non-negative price.
    pub price: f64,
    /// Ordered product image blobs.
    pub image_ids: Vec<BlobId>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to create a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub artisan_id: ArtisanId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_ids: Vec<BlobId>,
}

/// Full-field replacement of a product's editable fields.
///
/// `image_ids` is `None` when the client supplied no new images, in
/// which case the existing image set is kept; `Some` replaces the whole
/// set (the caller is responsible for deleting the old blobs).
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_ids: Option<Vec<BlobId>>,
}

/// Product as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: ProductId,
    pub artisan_id: ArtisanId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_ids: Vec<BlobId>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            artisan_id: product.artisan_id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            image_ids: product.image_ids.clone(),
        }
    }
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self::from(&product)
    }
}

/// Product enriched with the owning artisan's public contact details,
/// as returned by the public catalogue listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    #[serde(flatten)]
    pub product: ProductView,
    pub shopname: String,
    pub contact_number: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_flattens_product_fields() {
        let product = Product {
            id: ProductId::new(),
            artisan_id: ArtisanId::new(),
            name: "Mug".to_string(),
            description: "Clay mug".to_string(),
            price: 9.99,
            image_ids: vec![BlobId::new()],
            created_at: Utc::now(),
        };

        let listing = ProductListing {
            product: ProductView::from(&product),
            shopname: "Clayworks".to_string(),
            contact_number: "N/A".to_string(),
        };

        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["name"], "Mug");
        assert_eq!(json["price"], 9.99);
        assert_eq!(json["shopname"], "Clayworks");
        assert_eq!(json["contactNumber"], "N/A");
        assert_eq!(json["imageIds"].as_array().unwrap().len(), 1);
    }
}
