//! `PostgreSQL` store implementations.
//!
//! Uses the sqlx runtime query API with explicit row mapping so the
//! crate builds without a live database. Queries are plain SQL against
//! the tables created by `migrations/`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use uuid::Uuid;

use artisan_collective_core::{ArtisanId, BlobId, ProductId};

use super::{ArtisanStore, BlobStore, ProductStore, StoreError};
use crate::models::blob::chunk_bytes;
use crate::models::{
    Artisan, Blob, NewArtisan, NewBlob, NewProduct, Product, ProductUpdate, ProfileUpdate,
    RatingSummary,
};

/// Embedded migrations from `crates/server/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique-constraint violation to `StoreError::Conflict`.
fn conflict_on_unique(e: sqlx::Error, what: &str) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return StoreError::Conflict(format!("{what} already exists"));
    }
    StoreError::Database(e)
}

// =============================================================================
// Artisans
// =============================================================================

/// `PostgreSQL`-backed artisan store.
pub struct PgArtisanStore {
    pool: PgPool,
}

impl PgArtisanStore {
    /// Create a new artisan store on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_artisan(row: &PgRow) -> Result<Artisan, sqlx::Error> {
    Ok(Artisan {
        id: ArtisanId::from_uuid(row.try_get::<Uuid, _>("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        fullname: row.try_get("fullname")?,
        shopname: row.try_get("shopname")?,
        address: row.try_get("address")?,
        geolocation: row.try_get("geolocation")?,
        story: row.try_get("story")?,
        video_id: row
            .try_get::<Option<Uuid>, _>("video_id")?
            .map(BlobId::from_uuid),
        profile_image_id: row
            .try_get::<Option<Uuid>, _>("profile_image_id")?
            .map(BlobId::from_uuid),
        contact_number: row.try_get("contact_number")?,
        rating_sum: row.try_get("rating_sum")?,
        rating_count: row.try_get("rating_count")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

const ARTISAN_COLUMNS: &str = "id, username, password_hash, fullname, shopname, address, \
     geolocation, story, video_id, profile_image_id, contact_number, \
     rating_sum, rating_count, created_at";

#[async_trait]
impl ArtisanStore for PgArtisanStore {
    async fn insert(&self, artisan: NewArtisan) -> Result<Artisan, StoreError> {
        let sql = format!(
            "INSERT INTO artisan \
             (username, password_hash, fullname, shopname, address, geolocation, \
              story, video_id, profile_image_id, contact_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ARTISAN_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(&artisan.username)
            .bind(&artisan.password_hash)
            .bind(&artisan.fullname)
            .bind(&artisan.shopname)
            .bind(&artisan.address)
            .bind(&artisan.geolocation)
            .bind(&artisan.story)
            .bind(artisan.video_id.map(|b| b.as_uuid()))
            .bind(artisan.profile_image_id.map(|b| b.as_uuid()))
            .bind(&artisan.contact_number)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "username"))?;

        Ok(map_artisan(&row)?)
    }

    async fn get(&self, id: ArtisanId) -> Result<Option<Artisan>, StoreError> {
        let sql = format!("SELECT {ARTISAN_COLUMNS} FROM artisan WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_artisan).transpose().map_err(Into::into)
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Artisan>, StoreError> {
        let sql = format!("SELECT {ARTISAN_COLUMNS} FROM artisan WHERE username = $1");
        let row = sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_artisan).transpose().map_err(Into::into)
    }

    async fn list(&self) -> Result<Vec<Artisan>, StoreError> {
        let sql = format!("SELECT {ARTISAN_COLUMNS} FROM artisan ORDER BY created_at ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut artisans = Vec::with_capacity(rows.len());
        for row in &rows {
            artisans.push(map_artisan(row)?);
        }
        Ok(artisans)
    }

    async fn update_profile(
        &self,
        id: ArtisanId,
        update: ProfileUpdate,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE artisan \
             SET fullname = $2, shopname = $3, address = $4, story = $5, contact_number = $6 \
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(&update.fullname)
        .bind(&update.shopname)
        .bind(&update.address)
        .bind(&update.story)
        .bind(&update.contact_number)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn add_rating(
        &self,
        id: ArtisanId,
        rating: f64,
    ) -> Result<Option<RatingSummary>, StoreError> {
        // One atomic statement: no application-level read-modify-write.
        let row = sqlx::query(
            "UPDATE artisan \
             SET rating_sum = rating_sum + $2, rating_count = rating_count + 1 \
             WHERE id = $1 \
             RETURNING rating_sum, rating_count",
        )
        .bind(id.as_uuid())
        .bind(rating)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(RatingSummary {
            rating_sum: row.try_get("rating_sum")?,
            rating_count: row.try_get("rating_count")?,
        }))
    }
}

// =============================================================================
// Products
// =============================================================================

/// `PostgreSQL`-backed product store.
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    /// Create a new product store on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_product(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
        artisan_id: ArtisanId::from_uuid(row.try_get::<Uuid, _>("artisan_id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        image_ids: row
            .try_get::<Vec<Uuid>, _>("image_ids")?
            .into_iter()
            .map(BlobId::from_uuid)
            .collect(),
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
    })
}

const PRODUCT_COLUMNS: &str =
    "id, artisan_id, name, description, price, image_ids, created_at";

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, product: NewProduct) -> Result<Product, StoreError> {
        let image_ids: Vec<Uuid> = product.image_ids.iter().map(|id| id.as_uuid()).collect();
        let sql = format!(
            "INSERT INTO product (artisan_id, name, description, price, image_ids) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(product.artisan_id.as_uuid())
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&image_ids)
            .fetch_one(&self.pool)
            .await?;

        Ok(map_product(&row)?)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_product).transpose().map_err(Into::into)
    }

    async fn get_owned(
        &self,
        id: ProductId,
        owner: ArtisanId,
    ) -> Result<Option<Product>, StoreError> {
        let sql =
            format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1 AND artisan_id = $2");
        let row = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(owner.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_product).transpose().map_err(Into::into)
    }

    async fn list_by_artisan(&self, owner: ArtisanId) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE artisan_id = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(owner.as_uuid())
            .fetch_all(&self.pool)
            .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in &rows {
            products.push(map_product(row)?);
        }
        Ok(products)
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY created_at ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in &rows {
            products.push(map_product(row)?);
        }
        Ok(products)
    }

    async fn update(&self, id: ProductId, update: ProductUpdate) -> Result<(), StoreError> {
        let result = match update.image_ids {
            Some(image_ids) => {
                let image_ids: Vec<Uuid> = image_ids.iter().map(|i| i.as_uuid()).collect();
                sqlx::query(
                    "UPDATE product \
                     SET name = $2, description = $3, price = $4, image_ids = $5 \
                     WHERE id = $1",
                )
                .bind(id.as_uuid())
                .bind(&update.name)
                .bind(&update.description)
                .bind(update.price)
                .bind(&image_ids)
                .execute(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE product SET name = $2, description = $3, price = $4 WHERE id = $1",
                )
                .bind(id.as_uuid())
                .bind(&update.name)
                .bind(&update.description)
                .bind(update.price)
                .execute(&self.pool)
                .await?
            }
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// =============================================================================
// Blobs
// =============================================================================

/// `PostgreSQL`-backed chunked blob store.
///
/// A blob is a metadata row plus ordered `blob_chunk` rows; chunk rows
/// cascade on delete of the metadata row.
pub struct PgBlobStore {
    pool: PgPool,
}

impl PgBlobStore {
    /// Create a new blob store on the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlobStore for PgBlobStore {
    async fn put(&self, blob: NewBlob) -> Result<BlobId, StoreError> {
        let chunks = chunk_bytes(&blob.data);
        let length = i64::try_from(blob.data.len())
            .map_err(|_| StoreError::Corrupt("blob too large".to_owned()))?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "INSERT INTO blob (filename, content_type, length, chunk_size) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(&blob.filename)
        .bind(&blob.content_type)
        .bind(length)
        .bind(i32::try_from(crate::models::blob::CHUNK_SIZE).unwrap_or(i32::MAX))
        .fetch_one(&mut *tx)
        .await?;
        let id: Uuid = row.try_get("id")?;

        for (seq, chunk) in chunks.iter().enumerate() {
            sqlx::query("INSERT INTO blob_chunk (blob_id, seq, data) VALUES ($1, $2, $3)")
                .bind(id)
                .bind(i32::try_from(seq).map_err(|_| {
                    StoreError::Corrupt("blob has too many chunks".to_owned())
                })?)
                .bind(chunk.as_ref())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(BlobId::from_uuid(id))
    }

    async fn get(&self, id: BlobId) -> Result<Option<Blob>, StoreError> {
        let row = sqlx::query("SELECT filename, content_type, length FROM blob WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let filename: String = row.try_get("filename")?;
        let content_type: String = row.try_get("content_type")?;
        let length: i64 = row.try_get("length")?;
        let length = u64::try_from(length)
            .map_err(|_| StoreError::Corrupt("negative blob length".to_owned()))?;

        let chunk_rows =
            sqlx::query("SELECT data FROM blob_chunk WHERE blob_id = $1 ORDER BY seq ASC")
                .bind(id.as_uuid())
                .fetch_all(&self.pool)
                .await?;

        let mut chunks = Vec::with_capacity(chunk_rows.len());
        for chunk_row in &chunk_rows {
            let data: Vec<u8> = chunk_row.try_get("data")?;
            chunks.push(Bytes::from(data));
        }

        Ok(Some(Blob {
            id,
            filename,
            content_type,
            length,
            chunks,
        }))
    }

    async fn delete(&self, id: BlobId) -> Result<(), StoreError> {
        // Chunk rows cascade.
        sqlx::query("DELETE FROM blob WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
