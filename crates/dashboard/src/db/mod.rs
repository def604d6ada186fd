//! Database operations for the dashboard's own `PostgreSQL`.
//!
//! # Schema: `dashboard`
//!
//! ## Tables
//!
//! - `session` - HTTP session storage (managed by `tower-sessions`)
//! - `vendor_preference` - Per-vendor dashboard preferences (JSONB)
//!
//! Orders, stores, products and the rest live in the managed backend and are
//! reached through [`crate::backend::Backend`], not this pool.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/dashboard/migrations/` and run via:
//! ```bash
//! cargo run -p vendor-hub-cli -- migrate
//! ```

pub mod preferences;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use preferences::PreferenceRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

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
