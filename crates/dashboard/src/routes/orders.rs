//! Order, delivery board and queue dispatch handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use serde::Deserialize;

use vendor_hub_core::{DeliveryStatus, OrderId, QueueTier, StoreId};

use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::models::{DeliveryDetailsUpdate, Order};
use crate::services::{
    DeliveryBoard, DeliveryService, DispatchOutcome, OrderService, OrderTransitions, StatusChange,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores/{id}/orders", get(list_orders))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/transitions", get(transitions))
        .route("/api/orders/{id}/status", post(change_status))
        .route("/api/orders/{id}/delivery", patch(update_delivery))
        .route("/api/stores/{id}/deliveries", get(delivery_board))
        .route("/api/stores/{id}/queues/{tier}/dispatch", post(dispatch))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    /// Comma-separated status labels, or `active`.
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderFilter {
    fn statuses(&self) -> Result<Vec<DeliveryStatus>, AppError> {
        let Some(raw) = self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(Vec::new());
        };
        if raw.eq_ignore_ascii_case("active") {
            return Ok(DeliveryStatus::ACTIVE.to_vec());
        }
        raw.split(',')
            .map(|s| s.parse().map_err(|e: vendor_hub_core::DeliveryError| AppError::BadRequest(e.to_string())))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
    /// When set, the order must belong to this store.
    #[serde(default)]
    pub store_id: Option<StoreId>,
}

/// GET /api/stores/{id}/orders?status=
async fn list_orders(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>, AppError> {
    let statuses = filter.statuses()?;
    let token = vendor.token();
    let service = OrderService::new(state.backend(), &token);
    Ok(Json(service.list(store, &statuses).await?))
}

/// GET /api/orders/{id}
async fn get_order(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    let token = vendor.token();
    Ok(Json(OrderService::new(state.backend(), &token).get(id).await?))
}

/// GET /api/orders/{id}/transitions
async fn transitions(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderTransitions>, AppError> {
    let token = vendor.token();
    let service = OrderService::new(state.backend(), &token);
    Ok(Json(service.transitions(id).await?))
}

/// POST /api/orders/{id}/status
async fn change_status(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<StatusChange>, AppError> {
    let next: DeliveryStatus = body
        .status
        .parse()
        .map_err(|e: vendor_hub_core::DeliveryError| AppError::BadRequest(e.to_string()))?;
    let token = vendor.token();
    let service = OrderService::new(state.backend(), &token);
    Ok(Json(service.change_status(body.store_id, id, next).await?))
}

/// Delivery-detail edits, optionally scoped to the store being viewed.
#[derive(Debug, Deserialize)]
struct DeliveryRequest {
    #[serde(default)]
    store_id: Option<StoreId>,
    #[serde(flatten)]
    update: DeliveryDetailsUpdate,
}

/// PATCH /api/orders/{id}/delivery
async fn update_delivery(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<DeliveryRequest>,
) -> Result<Json<Order>, AppError> {
    let token = vendor.token();
    let service = OrderService::new(state.backend(), &token);
    Ok(Json(
        service
            .update_delivery_details(body.store_id, id, body.update)
            .await?,
    ))
}

/// GET /api/stores/{id}/deliveries
async fn delivery_board(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
) -> Result<Json<DeliveryBoard>, AppError> {
    let token = vendor.token();
    Ok(Json(DeliveryService::new(state.backend(), &token).board(store).await?))
}

/// POST /api/stores/{id}/queues/{tier}/dispatch
async fn dispatch(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path((store, tier)): Path<(StoreId, String)>,
) -> Result<Json<DispatchOutcome>, AppError> {
    let tier: QueueTier = tier.parse().map_err(AppError::BadRequest)?;
    let token = vendor.token();
    let service = DeliveryService::new(state.backend(), &token);
    Ok(Json(service.dispatch(store, tier).await?))
}
