//! Coupon handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use vendor_hub_core::{CouponDraft, CouponId, StoreId};

use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::models::Coupon;
use crate::services::coupons::{self, CouponPreview};
use crate::services::CouponService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/stores/{id}/coupons",
            get(list_coupons).post(create_coupon),
        )
        .route("/api/coupons/preview", post(preview_coupon))
        .route(
            "/api/coupons/{id}",
            patch(update_coupon).delete(delete_coupon),
        )
}

/// A PATCH body is either `{"is_active": bool}` or a full coupon form.
#[derive(Debug)]
enum CouponPatch {
    Toggle(bool),
    Replace(Box<CouponDraft>),
}

impl CouponPatch {
    fn parse(body: JsonValue) -> Result<Self, AppError> {
        if let Some(fields) = body.as_object()
            && fields.len() == 1
            && let Some(active) = fields.get("is_active").and_then(JsonValue::as_bool)
        {
            return Ok(Self::Toggle(active));
        }
        serde_json::from_value(body)
            .map(|draft| Self::Replace(Box::new(draft)))
            .map_err(|e| AppError::BadRequest(format!("Invalid coupon: {e}")))
    }
}

/// GET /api/stores/{id}/coupons
async fn list_coupons(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
) -> Result<Json<Vec<Coupon>>, AppError> {
    let token = vendor.token();
    Ok(Json(CouponService::new(state.backend(), &token).list(store).await?))
}

/// POST /api/stores/{id}/coupons
async fn create_coupon(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(store): Path<StoreId>,
    Json(draft): Json<CouponDraft>,
) -> Result<impl IntoResponse, AppError> {
    let token = vendor.token();
    let coupon = CouponService::new(state.backend(), &token)
        .create(store, &draft)
        .await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// PATCH /api/coupons/{id}
async fn update_coupon(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
    Json(body): Json<JsonValue>,
) -> Result<Json<Coupon>, AppError> {
    let token = vendor.token();
    let service = CouponService::new(state.backend(), &token);
    let coupon = match CouponPatch::parse(body)? {
        CouponPatch::Toggle(active) => service.set_active(id, active).await?,
        CouponPatch::Replace(draft) => service.update(id, &draft).await?,
    };
    Ok(Json(coupon))
}

#[derive(Debug, Deserialize)]
struct PreviewRequest {
    subtotal: Decimal,
    #[serde(flatten)]
    draft: CouponDraft,
}

/// POST /api/coupons/preview
///
/// Prices a cart subtotal with an unsaved coupon form. Nothing is stored.
async fn preview_coupon(
    RequireVendorAuth(_vendor): RequireVendorAuth,
    Json(body): Json<PreviewRequest>,
) -> Result<Json<CouponPreview>, AppError> {
    Ok(Json(coupons::preview(&body.draft, body.subtotal)?))
}

/// DELETE /api/coupons/{id}
async fn delete_coupon(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<CouponId>,
) -> Result<StatusCode, AppError> {
    let token = vendor.token();
    CouponService::new(state.backend(), &token).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::routes::test_support::{app, json, send, sign_in_with_store};

    #[test]
    fn test_patch_body_shapes() {
        let toggle = CouponPatch::parse(serde_json::json!({ "is_active": false })).unwrap();
        assert!(matches!(toggle, CouponPatch::Toggle(false)));

        let full = CouponPatch::parse(serde_json::json!({
            "code": "TET2026",
            "discount_kind": "percentage",
            "value": "15",
            "is_active": false
        }))
        .unwrap();
        assert!(matches!(full, CouponPatch::Replace(d) if d.code == "TET2026"));
    }

    #[tokio::test]
    async fn test_blank_code_never_reaches_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let (cookie, store) = sign_in_with_store(&app, &backend).await;
        let before = backend.call_count();

        let body = serde_json::json!({ "code": "  ", "discount_kind": "fixed_amount", "value": "20000" });
        let uri = format!("/api/stores/{store}/coupons");
        let response = send(&app, "POST", &uri, Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(backend.call_count(), before);
    }

    #[tokio::test]
    async fn test_create_and_toggle() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let (cookie, store) = sign_in_with_store(&app, &backend).await;

        let body = serde_json::json!({ "code": "freeship", "discount_kind": "fixed_amount", "value": "15000" });
        let uri = format!("/api/stores/{store}/coupons");
        let response = send(&app, "POST", &uri, Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let coupon = json(response).await;
        assert_eq!(coupon["is_active"], true);

        let uri = format!("/api/coupons/{}", coupon["id"].as_str().unwrap());
        let body = serde_json::json!({ "is_active": false });
        let response = send(&app, "PATCH", &uri, Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["is_active"], false);
    }

    #[tokio::test]
    async fn test_preview_prices_subtotal_without_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let (cookie, _) = sign_in_with_store(&app, &backend).await;
        let before = backend.call_count();

        let body = serde_json::json!({
            "code": "freeship",
            "discount_kind": "fixed_amount",
            "value": "15000",
            "subtotal": "120000"
        });
        let response = send(&app, "POST", "/api/coupons/preview", Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let preview = json(response).await;
        assert_eq!(preview["code"], "FREESHIP");
        assert_eq!(preview["total"], "105000");
        assert_eq!(backend.call_count(), before);
    }

    #[tokio::test]
    async fn test_replace_clears_usage_limit() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let (cookie, store) = sign_in_with_store(&app, &backend).await;

        let body = serde_json::json!({
            "code": "tet2026",
            "discount_kind": "percentage",
            "value": "10",
            "usage_limit": 5
        });
        let uri = format!("/api/stores/{store}/coupons");
        let coupon = json(send(&app, "POST", &uri, Some(&cookie), Some(body)).await).await;
        assert_eq!(coupon["usage_limit"], 5);

        let uri = format!("/api/coupons/{}", coupon["id"].as_str().unwrap());
        let body = serde_json::json!({ "code": "tet2026", "discount_kind": "percentage", "value": "12" });
        let response = send(&app, "PATCH", &uri, Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json(response).await;
        assert_eq!(updated["usage_limit"], serde_json::Value::Null);
        assert_eq!(updated["value"], "12");
    }
}
