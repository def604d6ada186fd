//! Revenue and best-seller reports.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use vendor_hub_core::StoreId;

use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::models::{MonthlyRevenue, TopProduct};
use crate::services::{ReportService, ReportSummary};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores/{id}/reports/summary", get(summary))
        .route("/api/stores/{id}/reports/monthly", get(monthly))
        .route("/api/stores/{id}/reports/top-products", get(top_products))
}

/// `days` is the trailing window; omitted means all time.
#[derive(Debug, Default, Deserialize)]
pub struct ReportWindow {
    #[serde(default)]
    pub days: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/stores/{id}/reports/summary?days=
async fn summary(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<ReportSummary>, AppError> {
    let token = vendor.token();
    let service = ReportService::new(state.backend(), &token);
    Ok(Json(service.summary(store, window.days).await?))
}

/// GET /api/stores/{id}/reports/monthly
async fn monthly(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
) -> Result<Json<Vec<MonthlyRevenue>>, AppError> {
    let token = vendor.token();
    Ok(Json(ReportService::new(state.backend(), &token).monthly(store).await?))
}

/// GET /api/stores/{id}/reports/top-products?days=&limit=
async fn top_products(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
    Query(window): Query<ReportWindow>,
) -> Result<Json<Vec<TopProduct>>, AppError> {
    let token = vendor.token();
    let service = ReportService::new(state.backend(), &token);
    Ok(Json(
        service
            .top_products(store, window.days, window.limit)
            .await?,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::backend::MemoryBackend;
    use crate::routes::test_support::{app, json, send, sign_in_with_store};

    #[tokio::test]
    async fn test_window_validation() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let (cookie, store) = sign_in_with_store(&app, &backend).await;

        let uri = format!("/api/stores/{store}/reports/summary?days=30");
        let response = send(&app, "GET", &uri, Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["days"], 30);

        let uri = format!("/api/stores/{store}/reports/top-products?limit=500");
        let response = send(&app, "GET", &uri, Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json(response).await["error"],
            "limit: must be between 1 and 50"
        );
    }
}
