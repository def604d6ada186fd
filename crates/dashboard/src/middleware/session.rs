//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions: `SameSite=Lax`,
//! `HttpOnly`, secure on https deployments, 24 hours of inactivity.

use sqlx::PgPool;
use thiserror::Error;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AppConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "vh_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

const SESSION_SCHEMA: &str = "dashboard";
const SESSION_TABLE: &str = "session";

/// The session store could not be configured.
#[derive(Debug, Error)]
#[error("invalid session store configuration: {0}")]
pub struct SessionLayerError(String);

/// Create the session layer with the `PostgreSQL` store.
///
/// The `dashboard.session` table is created by the migrations.
///
/// # Errors
///
/// Returns `SessionLayerError` if the schema or table name is rejected.
pub fn create_session_layer(
    pool: &PgPool,
    config: &AppConfig,
) -> Result<SessionManagerLayer<PostgresStore>, SessionLayerError> {
    let store = PostgresStore::new(pool.clone())
        .with_schema_name(SESSION_SCHEMA)
        .map_err(SessionLayerError)?
        .with_table_name(SESSION_TABLE)
        .map_err(SessionLayerError)?;

    Ok(session_layer(store, config.is_secure()))
}

/// Cookie settings shared by every session store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
