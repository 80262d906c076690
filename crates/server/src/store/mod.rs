//! Storage abstractions for artisans, products, and blobs.
//!
//! Handlers only see the trait objects held by `AppState`; production
//! wires in the `PostgreSQL` implementations, tests substitute the
//! in-memory ones. No global store handles exist anywhere.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use artisan_collective_core::{ArtisanId, BlobId, ProductId};

use crate::models::{
    Artisan, Blob, NewArtisan, NewBlob, NewProduct, Product, ProductUpdate, ProfileUpdate,
    RatingSummary,
};

/// Errors surfaced by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    Corrupt(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Store for artisan account records.
#[async_trait]
pub trait ArtisanStore: Send + Sync {
    /// Persist a new artisan.
    ///
    /// Returns `StoreError::Conflict` if the username is already taken.
    async fn insert(&self, artisan: NewArtisan) -> Result<Artisan, StoreError>;

    /// Get an artisan by ID.
    async fn get(&self, id: ArtisanId) -> Result<Option<Artisan>, StoreError>;

    /// Get an artisan by login name.
    async fn get_by_username(&self, username: &str) -> Result<Option<Artisan>, StoreError>;

    /// List all artisans.
    async fn list(&self) -> Result<Vec<Artisan>, StoreError>;

    /// Replace the editable profile fields wholesale.
    ///
    /// Returns `StoreError::NotFound` if the artisan no longer exists.
    async fn update_profile(&self, id: ArtisanId, update: ProfileUpdate)
    -> Result<(), StoreError>;

    /// Record one rating as a single atomic increment of the stored
    /// sum and count. Returns `None` if the artisan does not exist.
    ///
    /// Concurrent raters cannot lose updates: the increment happens
    /// inside the store, not as an application-level read-modify-write.
    async fn add_rating(
        &self,
        id: ArtisanId,
        rating: f64,
    ) -> Result<Option<RatingSummary>, StoreError>;
}

/// Store for product records.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a new product.
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Get a product by ID.
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Get a product only if it is owned by `owner`.
    ///
    /// A product owned by someone else is indistinguishable from an
    /// absent one, which is exactly what the ownership check needs.
    async fn get_owned(
        &self,
        id: ProductId,
        owner: ArtisanId,
    ) -> Result<Option<Product>, StoreError>;

    /// List products owned by one artisan.
    async fn list_by_artisan(&self, owner: ArtisanId) -> Result<Vec<Product>, StoreError>;

    /// List every product in the catalogue.
    async fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Replace a product's editable fields.
    ///
    /// Returns `StoreError::NotFound` if the product no longer exists.
    async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<(), StoreError>;

    /// Delete a product record.
    async fn delete(&self, id: ProductId) -> Result<(), StoreError>;
}

/// Store for chunked binary objects.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store a blob, chunked, and return its generated ID.
    async fn put(&self, blob: NewBlob) -> Result<BlobId, StoreError>;

    /// Retrieve a blob with its ordered chunks.
    async fn get(&self, id: BlobId) -> Result<Option<Blob>, StoreError>;

    /// Delete a blob and its chunks. Deleting an absent blob is a no-op.
    async fn delete(&self, id: BlobId) -> Result<(), StoreError>;
}
