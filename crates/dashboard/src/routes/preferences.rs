//! Per-vendor dashboard preferences (table layouts, default store, filters).
//!
//! Stored in the dashboard's own database, not the backend.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde_json::Value as JsonValue;

use crate::db::{PreferenceRepository, RepositoryError, preferences::is_valid_key};
use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/preferences/{key}",
        get(get_preference)
            .put(put_preference)
            .delete(delete_preference),
    )
}

fn check_key(key: &str) -> Result<(), AppError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid preference key: {key}")))
    }
}

/// GET /api/preferences/{key}
async fn get_preference(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<JsonValue>, AppError> {
    check_key(&key)?;
    PreferenceRepository::new(state.pool())
        .get(vendor.id, &key)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No preference {key}")))
}

/// PUT /api/preferences/{key}
async fn put_preference(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<JsonValue>,
) -> Result<StatusCode, AppError> {
    check_key(&key)?;
    PreferenceRepository::new(state.pool())
        .set(vendor.id, &key, &value)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/preferences/{key}
async fn delete_preference(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    check_key(&key)?;
    match PreferenceRepository::new(state.pool())
        .delete(vendor.id, &key)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("No preference {key}"))),
        Err(e) => Err(e.into()),
    }
}
