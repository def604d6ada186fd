//! Store setup and product catalog handlers.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};

use vendor_hub_core::{ProductId, StoreId};

use crate::error::AppError;
use crate::middleware::RequireVendorAuth;
use crate::models::{Product, ProductUpdate, Store, StoreUpdate};
use crate::services::catalog::MAX_IMAGE_BYTES;
use crate::services::{CatalogService, ImageKind, ImageUpload, ProductDraft, StoreDraft};
use crate::state::AppState;

/// Multipart overhead allowed on top of the image itself.
const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

pub fn router() -> Router<AppState> {
    let uploads = Router::new()
        .route("/api/stores/{id}/images/{kind}", post(upload_store_image))
        .route("/api/products/{id}/image", post(upload_product_image))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + MULTIPART_SLACK_BYTES));

    Router::new()
        .route("/api/stores", get(list_stores).post(create_store))
        .route("/api/stores/{id}", get(get_store).patch(update_store))
        .route(
            "/api/stores/{id}/products",
            get(list_products).post(create_product),
        )
        .route(
            "/api/products/{id}",
            patch(update_product).delete(delete_product),
        )
        .merge(uploads)
}

/// GET /api/stores
async fn list_stores(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Store>>, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    Ok(Json(service.list_stores(vendor.id).await?))
}

/// POST /api/stores
async fn create_store(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Json(draft): Json<StoreDraft>,
) -> Result<impl IntoResponse, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    let store = service.create_store(vendor.id, draft).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// GET /api/stores/{id}
async fn get_store(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<Json<Store>, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    Ok(Json(service.get_store(id).await?))
}

/// PATCH /api/stores/{id}
async fn update_store(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
    Json(update): Json<StoreUpdate>,
) -> Result<Json<Store>, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    Ok(Json(service.update_store(id, update).await?))
}

/// POST /api/stores/{id}/images/{kind}
async fn upload_store_image(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path((id, kind)): Path<(StoreId, ImageKind)>,
    multipart: Multipart,
) -> Result<Json<Store>, AppError> {
    let upload = read_image(multipart).await?;
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    Ok(Json(service.upload_store_image(id, kind, upload).await?))
}

/// GET /api/stores/{id}/products
async fn list_products(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<Json<Vec<Product>>, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    Ok(Json(service.list_products(id).await?))
}

/// POST /api/stores/{id}/products
async fn create_product(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
    Json(draft): Json<ProductDraft>,
) -> Result<impl IntoResponse, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    let product = service.create_product(id, draft).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /api/products/{id}
async fn update_product(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    Ok(Json(service.update_product(id, update).await?))
}

/// DELETE /api/products/{id}
async fn delete_product(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    service.delete_product(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/products/{id}/image
async fn upload_product_image(
    RequireVendorAuth(vendor): RequireVendorAuth,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<Product>, AppError> {
    let upload = read_image(multipart).await?;
    let token = vendor.token();
    let service = CatalogService::new(state.backend(), &token, state.storage());
    Ok(Json(service.upload_product_image(id, upload).await?))
}

/// Take the `file` field of a multipart form.
async fn read_image(mut multipart: Multipart) -> Result<ImageUpload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok(ImageUpload {
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::BadRequest("A file field is required".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    use crate::backend::MemoryBackend;
    use crate::routes::test_support::{app, json, send, sign_in, sign_in_with_store};

    #[tokio::test]
    async fn test_store_setup_requires_name() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let cookie = sign_in(&app, &backend).await;

        let body = serde_json::json!({ "name": "   " });
        let response = send(&app, "POST", "/api/stores", Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "GET", "/api/stores", Some(&cookie), None).await;
        assert_eq!(json(response).await.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_product_lifecycle() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let (cookie, store) = sign_in_with_store(&app, &backend).await;

        let body = serde_json::json!({ "name": "Banh mi", "price": "25000", "stock": 40 });
        let uri = format!("/api/stores/{store}/products");
        let response = send(&app, "POST", &uri, Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let product = json(response).await;
        let id = product["id"].as_str().unwrap().to_string();

        let body = serde_json::json!({ "stock": 12 });
        let response = send(&app, "PATCH", &format!("/api/products/{id}"), Some(&cookie), Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["stock"], 12);

        let response = send(&app, "DELETE", &format!("/api/products/{id}"), Some(&cookie), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, "GET", &uri, Some(&cookie), None).await;
        assert_eq!(json(response).await.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_logo_upload() {
        let backend = Arc::new(MemoryBackend::new());
        let app = app(backend.clone());
        let (cookie, store) = sign_in_with_store(&app, &backend).await;

        let boundary = "vendorhubboundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"logo.png\"\r\n\
             Content-Type: image/png\r\n\r\nPNGDATA\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/stores/{store}/images/logo"))
            .header(header::COOKIE, &cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let store_json = json(response).await;
        let logo_url = store_json["logo_url"].as_str().unwrap();
        assert!(logo_url.contains(&format!("{store}/logo-")));
        assert!(logo_url.ends_with(".png"));
    }
}
