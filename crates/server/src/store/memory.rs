//! In-memory store implementations.
//!
//! Drop-in substitutes for the `PostgreSQL` stores, used by the test
//! suites and handy for running the server without a database. All
//! mutations happen under a single mutex per store, so the rating
//! increment has the same atomicity as the SQL statement it mirrors.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use artisan_collective_core::{ArtisanId, BlobId, ProductId};

use super::{ArtisanStore, BlobStore, ProductStore, StoreError};
use crate::models::blob::chunk_bytes;
use crate::models::{
    Artisan, Blob, NewArtisan, NewBlob, NewProduct, Product, ProductUpdate, ProfileUpdate,
    RatingSummary,
};

fn lock_poisoned() -> StoreError {
    StoreError::Corrupt("store lock poisoned".to_owned())
}

/// In-memory artisan store.
#[derive(Default)]
pub struct MemoryArtisanStore {
    rows: Mutex<HashMap<ArtisanId, Artisan>>,
}

impl MemoryArtisanStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtisanStore for MemoryArtisanStore {
    async fn insert(&self, artisan: NewArtisan) -> Result<Artisan, StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;

        if rows.values().any(|a| a.username == artisan.username) {
            return Err(StoreError::Conflict("username already exists".to_owned()));
        }

        let row = Artisan {
            id: ArtisanId::new(),
            username: artisan.username,
            password_hash: artisan.password_hash,
            fullname: artisan.fullname,
            shopname: artisan.shopname,
            address: artisan.address,
            geolocation: artisan.geolocation,
            story: artisan.story,
            video_id: artisan.video_id,
            profile_image_id: artisan.profile_image_id,
            contact_number: artisan.contact_number,
            rating_sum: 0.0,
            rating_count: 0,
            created_at: Utc::now(),
        };
        rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn get(&self, id: ArtisanId) -> Result<Option<Artisan>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Artisan>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        Ok(rows.values().find(|a| a.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<Artisan>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        let mut artisans: Vec<Artisan> = rows.values().cloned().collect();
        artisans.sort_by_key(|a| a.created_at);
        Ok(artisans)
    }

    async fn update_profile(
        &self,
        id: ArtisanId,
        update: ProfileUpdate,
    ) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        let row = rows.get_mut(&id).ok_or(StoreError::NotFound)?;

        row.fullname = update.fullname;
        row.shopname = update.shopname;
        row.address = update.address;
        row.story = update.story;
        row.contact_number = update.contact_number;

        Ok(())
    }

    async fn add_rating(
        &self,
        id: ArtisanId,
        rating: f64,
    ) -> Result<Option<RatingSummary>, StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        let Some(row) = rows.get_mut(&id) else {
            return Ok(None);
        };

        row.rating_sum += rating;
        row.rating_count += 1;

        Ok(Some(RatingSummary {
            rating_sum: row.rating_sum,
            rating_count: row.rating_count,
        }))
    }
}

/// In-memory product store.
#[derive(Default)]
pub struct MemoryProductStore {
    rows: Mutex<HashMap<ProductId, Product>>,
}

impl MemoryProductStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;

        let row = Product {
            id: ProductId::new(),
            artisan_id: product.artisan_id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_ids: product.image_ids,
            created_at: Utc::now(),
        };
        rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn get_owned(
        &self,
        id: ProductId,
        owner: ArtisanId,
    ) -> Result<Option<Product>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        Ok(rows
            .get(&id)
            .filter(|p| p.artisan_id == owner)
            .cloned())
    }

    async fn list_by_artisan(&self, owner: ArtisanId) -> Result<Vec<Product>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        let mut products: Vec<Product> = rows
            .values()
            .filter(|p| p.artisan_id == owner)
            .cloned()
            .collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        let mut products: Vec<Product> = rows.values().cloned().collect();
        products.sort_by_key(|p| p.created_at);
        Ok(products)
    }

    async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        let row = rows.get_mut(&id).ok_or(StoreError::NotFound)?;

        row.name = update.name;
        row.description = update.description;
        row.price = update.price;
        if let Some(image_ids) = update.image_ids {
            row.image_ids = image_ids;
        }

        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        rows.remove(&id);
        Ok(())
    }
}

/// In-memory chunked blob store.
#[derive(Default)]
pub struct MemoryBlobStore {
    rows: Mutex<HashMap<BlobId, Blob>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, blob: NewBlob) -> Result<BlobId, StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;

        let row = Blob {
            id: BlobId::new(),
            filename: blob.filename,
            content_type: blob.content_type,
            length: blob.data.len() as u64,
            chunks: chunk_bytes(&blob.data),
        };
        let id = row.id;
        rows.insert(id, row);

        Ok(id)
    }

    async fn get(&self, id: BlobId) -> Result<Option<Blob>, StoreError> {
        let rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        Ok(rows.get(&id).cloned())
    }

    async fn delete(&self, id: BlobId) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().map_err(|_| lock_poisoned())?;
        rows.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::models::blob::CHUNK_SIZE;

    fn new_artisan(username: &str) -> NewArtisan {
        NewArtisan {
            username: username.to_owned(),
            password_hash: "hash".to_owned(),
            fullname: "Test Artisan".to_owned(),
            shopname: "Shop".to_owned(),
            address: String::new(),
            geolocation: String::new(),
            story: String::new(),
            video_id: None,
            profile_image_id: None,
            contact_number: String::new(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryArtisanStore::new();
        store.insert(new_artisan("maria")).await.unwrap();

        let err = store.insert(new_artisan("maria")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_rating_increment_accumulates() {
        let store = MemoryArtisanStore::new();
        let artisan = store.insert(new_artisan("maria")).await.unwrap();

        let first = store.add_rating(artisan.id, 4.0).await.unwrap().unwrap();
        assert_eq!(first.rating_count, 1);
        assert!((first.average() - 4.0).abs() < f64::EPSILON);

        let second = store.add_rating(artisan.id, 5.0).await.unwrap().unwrap();
        assert_eq!(second.rating_count, 2);
        assert!((second.average() - 4.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_rating_missing_artisan_is_none() {
        let store = MemoryArtisanStore::new();
        let summary = store.add_rating(ArtisanId::new(), 3.0).await.unwrap();
        assert!(summary.is_none());
    }

    #[tokio::test]
    async fn test_get_owned_hides_other_owners() {
        let store = MemoryProductStore::new();
        let owner = ArtisanId::new();
        let stranger = ArtisanId::new();

        let product = store
            .insert(NewProduct {
                artisan_id: owner,
                name: "Mug".to_owned(),
                description: "Clay mug".to_owned(),
                price: 9.99,
                image_ids: vec![],
            })
            .await
            .unwrap();

        assert!(store.get_owned(product.id, owner).await.unwrap().is_some());
        assert!(store.get_owned(product.id, stranger).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_product_update_keeps_images_when_absent() {
        let store = MemoryProductStore::new();
        let image = BlobId::new();
        let product = store
            .insert(NewProduct {
                artisan_id: ArtisanId::new(),
                name: "Mug".to_owned(),
                description: "Clay mug".to_owned(),
                price: 9.99,
                image_ids: vec![image],
            })
            .await
            .unwrap();

        store
            .update(
                product.id,
                ProductUpdate {
                    name: "Vase".to_owned(),
                    description: "Clay vase".to_owned(),
                    price: 19.99,
                    image_ids: None,
                },
            )
            .await
            .unwrap();

        let updated = store.get(product.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Vase");
        assert_eq!(updated.image_ids, vec![image]);
    }

    #[tokio::test]
    async fn test_blob_round_trip_and_delete() {
        let store = MemoryBlobStore::new();
        let data = Bytes::from(vec![42u8; CHUNK_SIZE + 1]);

        let id = store
            .put(NewBlob {
                filename: "prod_photo.png".to_owned(),
                content_type: "image/png".to_owned(),
                data: data.clone(),
            })
            .await
            .unwrap();

        let blob = store.get(id).await.unwrap().unwrap();
        assert_eq!(blob.length, data.len() as u64);
        assert_eq!(blob.chunks.len(), 2);
        assert_eq!(blob.content_type, "image/png");

        store.delete(id).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());

        // Idempotent delete
        store.delete(id).await.unwrap();
    }
}
