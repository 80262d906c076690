//! Domain models and response types.
//!
//! Domain types carry everything the stores persist (including password
//! hashes); the `*View` types are the serializable shapes returned to
//! clients and never include credentials.

pub mod artisan;
pub mod blob;
pub mod product;
pub mod session;

pub use artisan::{Artisan, ArtisanView, NewArtisan, ProfileUpdate, RatingSummary};
pub use blob::{Blob, NewBlob};
pub use product::{NewProduct, Product, ProductListing, ProductUpdate, ProductView};
pub use session::{CurrentUser, session_keys};

/// Round a value to two decimal places for client display.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
