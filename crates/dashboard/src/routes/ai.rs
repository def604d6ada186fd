//! AI helpers for the product and delivery forms.

use axum::{Json, Router, extract::State, routing::post};

use crate::ai::{CapacityEstimate, CapacityRequest, ProductDescription, ProductDescriptionRequest};
use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai/product-description", post(product_description))
        .route("/api/ai/delivery-capacity", post(delivery_capacity))
}

/// POST /api/ai/product-description
async fn product_description(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Json(request): Json<ProductDescriptionRequest>,
) -> Result<Json<ProductDescription>, AppError> {
    tracing::debug!(vendor_id = %vendor.id, "Drafting product description");
    Ok(Json(state.ai().describe_product(&request).await?))
}

/// POST /api/ai/delivery-capacity
async fn delivery_capacity(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Json(request): Json<CapacityRequest>,
) -> Result<Json<CapacityEstimate>, AppError> {
    tracing::debug!(vendor_id = %vendor.id, "Estimating delivery capacity");
    Ok(Json(state.ai().estimate_capacity(&request).await?))
}
