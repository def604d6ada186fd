//! Review listing and replies.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;

use vendor_hub_core::{ReviewId, StoreId};

use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::models::Review;
use crate::services::ReviewService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores/{id}/reviews", get(list_reviews))
        .route("/api/reviews/{id}/reply", post(reply))
}

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    pub reply: String,
}

/// GET /api/stores/{id}/reviews
async fn list_reviews(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
) -> Result<Json<Vec<Review>>, AppError> {
    let token = vendor.token();
    Ok(Json(ReviewService::new(state.backend(), &token).list(store).await?))
}

/// POST /api/reviews/{id}/reply
async fn reply(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(body): Json<ReplyRequest>,
) -> Result<Json<Review>, AppError> {
    let token = vendor.token();
    let service = ReviewService::new(state.backend(), &token);
    Ok(Json(service.reply(id, &body.reply).await?))
}
