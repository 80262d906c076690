//! Session middleware configuration.
//!
//! Sets up cookie-correlated server-side sessions using tower-sessions.
//! Production uses the `PostgreSQL` store; tests use the in-memory
//! store so no database is required.

use sqlx::PgPool;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "ac_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &ServerConfig,
) -> SessionManagerLayer<PostgresStore> {
    // The sessions table is created by PostgresStore::migrate at startup
    let store = PostgresStore::new(pool.clone());
    configure(SessionManagerLayer::new(store), config.is_secure())
}

/// Create a session layer backed by the in-memory store.
///
/// Used by the test suites; sessions vanish on process exit.
#[must_use]
pub fn create_memory_session_layer() -> SessionManagerLayer<MemoryStore> {
    configure(SessionManagerLayer::new(MemoryStore::default()), false)
}

fn configure<S: tower_sessions::SessionStore>(
    layer: SessionManagerLayer<S>,
    is_secure: bool,
) -> SessionManagerLayer<S> {
    layer
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
