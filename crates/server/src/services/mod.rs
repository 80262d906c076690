//! Application services composing the stores.

pub mod auth;

pub use auth::{AuthError, AuthService, Signup};
