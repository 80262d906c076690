//! Authentication service.
//!
//! Password signup and login against the artisan store. Session
//! establishment is the route layer's job; this service only verifies
//! credentials and returns the artisan record.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::models::{Artisan, NewArtisan};
use crate::store::{ArtisanStore, StoreError};

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Username already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Signup data collected by the signup handler.
///
/// Required-field validation (username, password, fullname) happens at
/// the handler boundary before this is constructed; optional fields
/// default to empty strings.
#[derive(Debug, Clone)]
pub struct Signup {
    pub username: String,
    pub password: String,
    pub fullname: String,
    pub shopname: String,
    pub address: String,
    pub geolocation: String,
    pub story: String,
    pub video_id: Option<artisan_collective_core::BlobId>,
    pub profile_image_id: Option<artisan_collective_core::BlobId>,
    pub contact_number: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    artisans: &'a dyn ArtisanStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service over the artisan store.
    #[must_use]
    pub const fn new(artisans: &'a dyn ArtisanStore) -> Self {
        Self { artisans }
    }

    /// Register a new artisan with a salted Argon2 password hash.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UsernameTaken` if the username is already
    /// registered, `AuthError::PasswordHash` if hashing fails.
    pub async fn signup(&self, signup: Signup) -> Result<Artisan, AuthError> {
        let password_hash = hash_password(&signup.password)?;

        let artisan = self
            .artisans
            .insert(NewArtisan {
                username: signup.username,
                password_hash,
                fullname: signup.fullname,
                shopname: signup.shopname,
                address: signup.address,
                geolocation: signup.geolocation,
                story: signup.story,
                video_id: signup.video_id,
                profile_image_id: signup.profile_image_id,
                contact_number: signup.contact_number,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Store(other),
            })?;

        Ok(artisan)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` whether the user is
    /// absent or the password is wrong; callers cannot distinguish the
    /// two.
    pub async fn login(&self, username: &str, password: &str) -> Result<Artisan, AuthError> {
        let artisan = self
            .artisans
            .get_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &artisan.password_hash)?;

        Ok(artisan)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
