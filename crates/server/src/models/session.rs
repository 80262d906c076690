//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use artisan_collective_core::ArtisanId;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in artisan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Artisan's ID.
    pub id: ArtisanId,
    /// Artisan's login name.
    pub username: String,
}

/// Session keys for authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
