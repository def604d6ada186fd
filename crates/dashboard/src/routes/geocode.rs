//! Address lookup for the store setup and delivery forms.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::geocoding::{GeocodeCandidate, GeocodeResults};
use crate::middleware::RequireVendorAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/geocode/search", get(search))
        .route("/api/geocode/reverse", get(reverse))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ReverseQuery {
    pub lat: f64,
    pub lon: f64,
}

/// GET /api/geocode/search?q=
async fn search(
    RequireVendorAuth(_vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<GeocodeResults>, AppError> {
    Ok(Json(state.geocoding().search(&query.q).await?))
}

/// GET /api/geocode/reverse?lat=&lon=
async fn reverse(
    RequireVendorAuth(_vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Query(query): Query<ReverseQuery>,
) -> Result<Json<GeocodeCandidate>, AppError> {
    Ok(Json(state.geocoding().reverse(query.lat, query.lon).await?))
}
