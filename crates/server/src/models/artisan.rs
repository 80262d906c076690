//! Artisan domain types.
//!
//! These types represent validated domain objects separate from database
//! row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use artisan_collective_core::{ArtisanId, BlobId};

use super::round2;

/// An artisan account (domain type).
///
/// Carries the password hash; never serialize this type directly -
/// convert to [`ArtisanView`] for responses.
#[derive(Debug, Clone)]
pub struct Artisan {
    /// Unique artisan ID.
    pub id: ArtisanId,
    /// Unique login name.
    pub username: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Artisan's full name.
    pub fullname: String,
    /// Display name of the artisan's shop.
    pub shopname: String,
    /// Postal address.
    pub address: String,
    /// Free-text geolocation.
    pub geolocation: String,
    /// Free-text artisan story.
    pub story: String,
    /// Optional profile video blob.
    pub video_id: Option<BlobId>,
    /// Optional profile image blob.
    pub profile_image_id: Option<BlobId>,
    /// Contact phone number.
    pub contact_number: String,
    /// Sum of all submitted ratings.
    ///
    /// Stored as sum + count rather than a running average so a rating
    /// submission is a single atomic increment at the store layer.
    pub rating_sum: f64,
    /// Number of submitted ratings.
    pub rating_count: i64,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Artisan {
    /// The mean of all submitted ratings, or 0 when unrated.
    #[must_use]
    pub fn rating_average(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let count = self.rating_count as f64;
            self.rating_sum / count
        }
    }
}

/// Data required to create a new artisan account.
#[derive(Debug, Clone)]
pub struct NewArtisan {
    pub username: String,
    pub password_hash: String,
    pub fullname: String,
    pub shopname: String,
    pub address: String,
    pub geolocation: String,
    pub story: String,
    pub video_id: Option<BlobId>,
    pub profile_image_id: Option<BlobId>,
    pub contact_number: String,
}

/// Whole-field replacement of the editable profile fields.
///
/// Every field is written unconditionally; a field the client omitted
/// arrives here as an empty string and overwrites the stored value.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub fullname: String,
    pub shopname: String,
    pub address: String,
    pub story: String,
    pub contact_number: String,
}

/// Result of an atomic rating increment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub rating_sum: f64,
    pub rating_count: i64,
}

impl RatingSummary {
    /// The mean of all submitted ratings.
    #[must_use]
    pub fn average(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let count = self.rating_count as f64;
            self.rating_sum / count
        }
    }
}

/// Artisan as returned to clients: the full record minus the password
/// hash, with the derived rating average.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtisanView {
    pub id: ArtisanId,
    pub username: String,
    pub fullname: String,
    pub shopname: String,
    pub address: String,
    pub geolocation: String,
    pub story: String,
    pub video_id: Option<BlobId>,
    pub profile_image_id: Option<BlobId>,
    pub contact_number: String,
    pub rating: f64,
    pub rating_count: i64,
}

impl From<&Artisan> for ArtisanView {
    fn from(artisan: &Artisan) -> Self {
        Self {
            id: artisan.id,
            username: artisan.username.clone(),
            fullname: artisan.fullname.clone(),
            shopname: artisan.shopname.clone(),
            address: artisan.address.clone(),
            geolocation: artisan.geolocation.clone(),
            story: artisan.story.clone(),
            video_id: artisan.video_id,
            profile_image_id: artisan.profile_image_id,
            contact_number: artisan.contact_number.clone(),
            rating: round2(artisan.rating_average()),
            rating_count: artisan.rating_count,
        }
    }
}

impl From<Artisan> for ArtisanView {
    fn from(artisan: Artisan) -> Self {
        Self::from(&artisan)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn artisan(sum: f64, count: i64) -> Artisan {
        Artisan {
            id: ArtisanId::new(),
            username: "maria".to_string(),
            password_hash: "hash".to_string(),
            fullname: "Maria M".to_string(),
            shopname: "Clayworks".to_string(),
            address: String::new(),
            geolocation: String::new(),
            story: String::new(),
            video_id: None,
            profile_image_id: None,
            contact_number: String::new(),
            rating_sum: sum,
            rating_count: count,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unrated_average_is_zero() {
        assert!((artisan(0.0, 0).rating_average() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rating_average() {
        let a = artisan(14.0, 3);
        assert!((a.rating_average() - 14.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_view_excludes_password_hash() {
        let view = ArtisanView::from(artisan(9.0, 2));
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["rating"], 4.5);
        assert_eq!(json["ratingCount"], 2);
        assert_eq!(json["contactNumber"], "");
    }
}
