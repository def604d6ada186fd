//! HTTP implementation of [`Backend`] for the hosted backend.
//!
//! - Tables: `GET/POST/PATCH/DELETE {url}/rest/v1/<table>` with
//!   `column=op.value` filters and `Prefer: return=representation` on writes.
//! - RPC: `POST {url}/rest/v1/rpc/<function>` with a JSON argument object.
//! - Auth: `POST {url}/auth/v1/token?grant_type=password`, `POST {url}/auth/v1/logout`.
//! - Storage: `POST {url}/storage/v1/object/<bucket>/<path>`, served publicly
//!   from `{url}/storage/v1/object/public/<bucket>/<path>`.
//!
//! The project's anon key goes in the `apikey` header of every request; the
//! vendor's access token goes in `Authorization`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use vendor_hub_core::{
    CouponId, DeliveryStatus, Email, NotificationId, OrderId, ProductId, ReviewId, StoreId,
    VendorId,
};

use super::{AccessToken, Backend, BackendError};
use crate::config::BackendConfig;
use crate::models::{
    AuthSession, Coupon, CouponUpdate, DeliveryDetailsUpdate, MonthlyRevenue, NewCoupon,
    NewNotification, NewProduct, NewStore, Notification, Order, Product, ProductUpdate, Review,
    RevenueSummary, Store, StoreUpdate, TopProduct,
};

const REST_PATH: &str = "rest/v1";
const AUTH_PATH: &str = "auth/v1";
const STORAGE_PATH: &str = "storage/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Orders are always fetched with their line items embedded.
const ORDER_SELECT: &str = "*,order_items(*)";

type Query<'a> = Vec<(&'a str, String)>;

/// Backend HTTP client.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidConfig` if the anon key is not a valid
    /// header value, or `BackendError::Http` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.anon_key.expose_secret()).map_err(|_| {
                BackendError::InvalidConfig("anon key contains invalid header characters".into())
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.url.as_str().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    fn table_url(&self, table: &str) -> String {
        self.endpoint(&format!("{REST_PATH}/{table}"))
    }

    /// Public URL of an object in a public bucket.
    #[must_use]
    pub fn public_object_url(&self, bucket: &str, path: &str) -> String {
        self.endpoint(&format!("{STORAGE_PATH}/object/public/{bucket}/{path}"))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let response = self
            .inner
            .client
            .get(self.table_url(table))
            .bearer_auth(token.expose())
            .query(query)
            .send()
            .await?;

        decode(response).await
    }

    async fn select_by_id<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        table: &str,
        id: Uuid,
        columns: &str,
    ) -> Result<T, BackendError> {
        let query = [
            ("select", columns.to_string()),
            ("id", eq(id)),
            ("limit", "1".to_string()),
        ];
        let rows: Vec<T> = self.select(token, table, &query).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("{table} {id}")))
    }

    async fn insert<B, T>(
        &self,
        token: &AccessToken,
        table: &str,
        body: &B,
        columns: &str,
    ) -> Result<T, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .post(self.table_url(table))
            .bearer_auth(token.expose())
            .header("Prefer", "return=representation")
            .query(&[("select", columns)])
            .json(body)
            .send()
            .await?;

        let rows: Vec<T> = decode(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("empty insert response from {table}")))
    }

    async fn patch<B, T>(
        &self,
        token: &AccessToken,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
    ) -> Result<Vec<T>, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .client
            .patch(self.table_url(table))
            .bearer_auth(token.expose())
            .header("Prefer", "return=representation")
            .query(filters)
            .json(body)
            .send()
            .await?;

        decode(response).await
    }

    /// PATCH a single row by id. Zero affected rows means the row is missing
    /// or hidden from this user.
    async fn patch_by_id<B, T>(
        &self,
        token: &AccessToken,
        table: &str,
        id: Uuid,
        columns: &str,
        body: &B,
    ) -> Result<T, BackendError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let filters = [("id", eq(id)), ("select", columns.to_string())];
        let rows: Vec<T> = self.patch(token, table, &filters, body).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("{table} {id}")))
    }

    async fn delete_by_id(
        &self,
        token: &AccessToken,
        table: &str,
        id: Uuid,
    ) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .delete(self.table_url(table))
            .bearer_auth(token.expose())
            .header("Prefer", "return=representation")
            .query(&[("id", eq(id)), ("select", "id".to_string())])
            .send()
            .await?;

        let rows: Vec<serde_json::Value> = decode(response).await?;
        if rows.is_empty() {
            return Err(BackendError::NotFound(format!("{table} {id}")));
        }
        Ok(())
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        function: &str,
        params: &serde_json::Value,
    ) -> Result<T, BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&format!("{REST_PATH}/rpc/{function}")))
            .bearer_auth(token.expose())
            .json(params)
            .send()
            .await?;

        decode(response).await
    }
}

#[async_trait]
impl Backend for BackendClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&format!("{AUTH_PATH}/token")))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email.as_str(), "password": password }))
            .send()
            .await?;

        // The auth server answers bad credentials with 400.
        match decode(response).await {
            Err(BackendError::Api { status: 400, message }) => {
                Err(BackendError::Unauthorized(message))
            }
            other => other,
        }
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&format!("{AUTH_PATH}/logout")))
            .bearer_auth(token.expose())
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(error_from_response(status, response).await)
        }
    }

    #[instrument(skip(self, token), fields(vendor_id = %vendor))]
    async fn list_stores(
        &self,
        token: &AccessToken,
        vendor: VendorId,
    ) -> Result<Vec<Store>, BackendError> {
        let query: Query<'_> = vec![
            ("select", "*".to_string()),
            ("vendor_id", eq(vendor)),
            ("order", "created_at.asc".to_string()),
        ];
        self.select(token, "stores", &query).await
    }

    #[instrument(skip(self, token), fields(store_id = %id))]
    async fn get_store(&self, token: &AccessToken, id: StoreId) -> Result<Store, BackendError> {
        self.select_by_id(token, "stores", id.as_uuid(), "*").await
    }

    #[instrument(skip(self, token, store), fields(name = %store.name))]
    async fn create_store(
        &self,
        token: &AccessToken,
        store: &NewStore,
    ) -> Result<Store, BackendError> {
        self.insert(token, "stores", store, "*").await
    }

    #[instrument(skip(self, token, update), fields(store_id = %id))]
    async fn update_store(
        &self,
        token: &AccessToken,
        id: StoreId,
        update: &StoreUpdate,
    ) -> Result<Store, BackendError> {
        self.patch_by_id(token, "stores", id.as_uuid(), "*", update)
            .await
    }

    #[instrument(skip(self, token), fields(store_id = %store))]
    async fn list_products(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Product>, BackendError> {
        let query: Query<'_> = vec![
            ("select", "*".to_string()),
            ("store_id", eq(store)),
            ("order", "created_at.desc".to_string()),
        ];
        self.select(token, "products", &query).await
    }

    #[instrument(skip(self, token), fields(product_id = %id))]
    async fn get_product(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<Product, BackendError> {
        self.select_by_id(token, "products", id.as_uuid(), "*").await
    }

    #[instrument(skip(self, token, product), fields(store_id = %product.store_id))]
    async fn create_product(
        &self,
        token: &AccessToken,
        product: &NewProduct,
    ) -> Result<Product, BackendError> {
        self.insert(token, "products", product, "*").await
    }

    #[instrument(skip(self, token, update), fields(product_id = %id))]
    async fn update_product(
        &self,
        token: &AccessToken,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, BackendError> {
        self.patch_by_id(token, "products", id.as_uuid(), "*", update)
            .await
    }

    #[instrument(skip(self, token), fields(product_id = %id))]
    async fn delete_product(
        &self,
        token: &AccessToken,
        id: ProductId,
    ) -> Result<(), BackendError> {
        self.delete_by_id(token, "products", id.as_uuid()).await
    }

    #[instrument(skip(self, token), fields(store_id = %store, statuses = statuses.len()))]
    async fn list_orders(
        &self,
        token: &AccessToken,
        store: StoreId,
        statuses: &[DeliveryStatus],
    ) -> Result<Vec<Order>, BackendError> {
        let mut query: Query<'_> = vec![
            ("select", ORDER_SELECT.to_string()),
            ("store_id", eq(store)),
            ("order", "created_at.desc".to_string()),
        ];
        if !statuses.is_empty() {
            query.push(("status", in_list(statuses)));
        }
        self.select(token, "orders", &query).await
    }

    #[instrument(skip(self, token), fields(order_id = %id))]
    async fn get_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, BackendError> {
        self.select_by_id(token, "orders", id.as_uuid(), ORDER_SELECT)
            .await
    }

    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    async fn update_order_status(
        &self,
        token: &AccessToken,
        id: OrderId,
        status: DeliveryStatus,
    ) -> Result<Order, BackendError> {
        let body = json!({ "status": status, "updated_at": Utc::now() });
        self.patch_by_id(token, "orders", id.as_uuid(), ORDER_SELECT, &body)
            .await
    }

    #[instrument(skip(self, token, update), fields(order_id = %id))]
    async fn update_delivery_details(
        &self,
        token: &AccessToken,
        id: OrderId,
        update: &DeliveryDetailsUpdate,
    ) -> Result<Order, BackendError> {
        self.patch_by_id(token, "orders", id.as_uuid(), ORDER_SELECT, update)
            .await
    }

    #[instrument(skip(self, token), fields(store_id = %store))]
    async fn list_coupons(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Coupon>, BackendError> {
        let query: Query<'_> = vec![
            ("select", "*".to_string()),
            ("store_id", eq(store)),
            ("order", "created_at.desc".to_string()),
        ];
        self.select(token, "coupons", &query).await
    }

    #[instrument(skip(self, token, coupon), fields(store_id = %coupon.store_id, code = %coupon.code))]
    async fn create_coupon(
        &self,
        token: &AccessToken,
        coupon: &NewCoupon,
    ) -> Result<Coupon, BackendError> {
        self.insert(token, "coupons", coupon, "*").await
    }

    #[instrument(skip(self, token, update), fields(coupon_id = %id))]
    async fn update_coupon(
        &self,
        token: &AccessToken,
        id: CouponId,
        update: &CouponUpdate,
    ) -> Result<Coupon, BackendError> {
        self.patch_by_id(token, "coupons", id.as_uuid(), "*", update)
            .await
    }

    #[instrument(skip(self, token), fields(coupon_id = %id))]
    async fn delete_coupon(&self, token: &AccessToken, id: CouponId) -> Result<(), BackendError> {
        self.delete_by_id(token, "coupons", id.as_uuid()).await
    }

    #[instrument(skip(self, token), fields(store_id = %store))]
    async fn list_reviews(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Review>, BackendError> {
        let query: Query<'_> = vec![
            ("select", "*".to_string()),
            ("store_id", eq(store)),
            ("order", "created_at.desc".to_string()),
        ];
        self.select(token, "reviews", &query).await
    }

    #[instrument(skip(self, token, reply), fields(review_id = %id))]
    async fn reply_to_review(
        &self,
        token: &AccessToken,
        id: ReviewId,
        reply: &str,
    ) -> Result<Review, BackendError> {
        let body = json!({ "reply": reply, "replied_at": Utc::now() });
        self.patch_by_id(token, "reviews", id.as_uuid(), "*", &body)
            .await
    }

    #[instrument(skip(self, token), fields(user_id = %user))]
    async fn list_notifications(
        &self,
        token: &AccessToken,
        user: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, BackendError> {
        let mut query: Query<'_> = vec![
            ("select", "*".to_string()),
            ("user_id", eq(user)),
            ("order", "created_at.desc".to_string()),
        ];
        if unread_only {
            query.push(("is_read", "eq.false".to_string()));
        }
        self.select(token, "notifications", &query).await
    }

    #[instrument(skip(self, token, notification), fields(user_id = %notification.user_id))]
    async fn create_notification(
        &self,
        token: &AccessToken,
        notification: &NewNotification,
    ) -> Result<Notification, BackendError> {
        self.insert(token, "notifications", notification, "*").await
    }

    #[instrument(skip(self, token), fields(notification_id = %id))]
    async fn mark_notification_read(
        &self,
        token: &AccessToken,
        id: NotificationId,
    ) -> Result<Notification, BackendError> {
        let body = json!({ "is_read": true });
        self.patch_by_id(token, "notifications", id.as_uuid(), "*", &body)
            .await
    }

    #[instrument(skip(self, token), fields(user_id = %user))]
    async fn mark_all_notifications_read(
        &self,
        token: &AccessToken,
        user: Uuid,
    ) -> Result<usize, BackendError> {
        let filters = [
            ("user_id", eq(user)),
            ("is_read", "eq.false".to_string()),
            ("select", "id".to_string()),
        ];
        let rows: Vec<serde_json::Value> = self
            .patch(token, "notifications", &filters, &json!({ "is_read": true }))
            .await?;
        Ok(rows.len())
    }

    #[instrument(skip(self, token), fields(store_id = %store))]
    async fn revenue_summary(
        &self,
        token: &AccessToken,
        store: StoreId,
        days: Option<u32>,
    ) -> Result<RevenueSummary, BackendError> {
        let params = json!({ "p_store_id": store, "p_days": days });
        let value: serde_json::Value = self.rpc(token, "get_revenue_summary", &params).await?;
        // Set-returning functions answer with a one-row array.
        let row = match value {
            serde_json::Value::Array(rows) => rows
                .into_iter()
                .next()
                .ok_or_else(|| BackendError::Decode("empty revenue summary".to_string()))?,
            other => other,
        };
        serde_json::from_value(row).map_err(|e| BackendError::Decode(e.to_string()))
    }

    #[instrument(skip(self, token), fields(store_id = %store))]
    async fn monthly_revenue(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<MonthlyRevenue>, BackendError> {
        self.rpc(token, "get_monthly_revenue", &json!({ "p_store_id": store }))
            .await
    }

    #[instrument(skip(self, token), fields(store_id = %store))]
    async fn top_products(
        &self,
        token: &AccessToken,
        store: StoreId,
        days: Option<u32>,
        limit: u32,
    ) -> Result<Vec<TopProduct>, BackendError> {
        let params = json!({ "p_store_id": store, "p_days": days, "p_limit": limit });
        self.rpc(token, "get_top_products", &params).await
    }

    #[instrument(skip(self, token, bytes), fields(bucket = %bucket, path = %path, size = bytes.len()))]
    async fn upload_object(
        &self,
        token: &AccessToken,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(&format!("{STORAGE_PATH}/object/{bucket}/{path}")))
            .bearer_auth(token.expose())
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_response(status, response).await);
        }
        Ok(self.public_object_url(bucket, path))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// `eq.<value>` filter.
fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

/// `in.("a","b")` filter over delivery statuses. Labels contain spaces, so
/// each one is quoted.
fn in_list(statuses: &[DeliveryStatus]) -> String {
    let quoted: Vec<String> = statuses
        .iter()
        .map(|s| format!("\"{}\"", s.as_str()))
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Decode a JSON response body, turning non-2xx statuses into errors.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, BackendError> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(status, response).await);
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Build a [`BackendError`] from an error response.
async fn error_from_response(status: StatusCode, response: reqwest::Response) -> BackendError {
    let body = response.text().await.unwrap_or_default();
    let message = parse_error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("backend request failed")
            .to_string()
    });

    match status {
        StatusCode::UNAUTHORIZED => BackendError::Unauthorized(message),
        StatusCode::NOT_FOUND => BackendError::NotFound(message),
        _ => BackendError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull a human-readable message out of an error body.
///
/// The table API uses `message`, the auth API uses `error_description` or
/// `msg`, and storage uses `message` or `error`.
fn parse_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error_description", "msg", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use axum::body::Bytes;
    use axum::extract::{Query as QueryParams, State};
    use axum::http::{HeaderMap as RequestHeaders, Method, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use url::Url;

    use super::*;
    use crate::models::CouponUpdate;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Url::parse("https://project.backend.test/").unwrap(),
            anon_key: SecretString::from("anon-key"),
        })
        .unwrap()
    }

    #[test]
    fn test_urls() {
        let client = client();
        assert_eq!(
            client.table_url("orders"),
            "https://project.backend.test/rest/v1/orders"
        );
        assert_eq!(
            client.public_object_url("product-images", "abc/product-1.png"),
            "https://project.backend.test/storage/v1/object/public/product-images/abc/product-1.png"
        );
    }

    #[test]
    fn test_filters() {
        let id = Uuid::nil();
        assert_eq!(eq(id), "eq.00000000-0000-0000-0000-000000000000");
        assert_eq!(
            in_list(&[DeliveryStatus::Confirmed, DeliveryStatus::DriverPickingUp]),
            "in.(\"Confirmed\",\"Driver Picking Up\")"
        );
    }

    #[test]
    fn test_parse_error_message() {
        assert_eq!(
            parse_error_message(r#"{"code":"23505","message":"duplicate key value"}"#),
            Some("duplicate key value".to_string())
        );
        assert_eq!(
            parse_error_message(
                r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#
            ),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(
            parse_error_message(r#"{"code":400,"msg":"Email not confirmed"}"#),
            Some("Email not confirmed".to_string())
        );
        assert_eq!(parse_error_message("<html>bad gateway</html>"), None);
        assert_eq!(parse_error_message(r#"{"message":"  "}"#), None);
    }

    #[test]
    fn test_invalid_anon_key_rejected() {
        let result = BackendClient::new(&BackendConfig {
            url: Url::parse("https://project.backend.test").unwrap(),
            anon_key: SecretString::from("bad\nkey"),
        });
        assert!(matches!(result, Err(BackendError::InvalidConfig(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", client());
        assert!(debug.contains("project.backend.test"));
        assert!(!debug.contains("anon-key"));
    }

    /// A request as the mock backend saw it.
    #[derive(Debug, Clone)]
    struct Seen {
        method: String,
        path: String,
        query: HashMap<String, String>,
        apikey: Option<String>,
        authorization: Option<String>,
        prefer: Option<String>,
        body: serde_json::Value,
    }

    impl Seen {
        fn param(&self, key: &str) -> Option<&str> {
            self.query.get(key).map(String::as_str)
        }
    }

    type Log = Arc<Mutex<Vec<Seen>>>;

    const VENDOR: &str = "2f1d9b0e-6a3c-4b8e-9d1f-0c2b4a6e8d10";

    async fn mock_backend(
        State(log): State<Log>,
        method: Method,
        uri: Uri,
        headers: RequestHeaders,
        QueryParams(query): QueryParams<HashMap<String, String>>,
        body: Bytes,
    ) -> Response {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap_or_default();
        log.lock().unwrap().push(Seen {
            method: method.to_string(),
            path: uri.path().to_string(),
            query,
            apikey: header("apikey"),
            authorization: header("authorization"),
            prefer: header("prefer"),
            body: body.clone(),
        });

        match (method.as_str(), uri.path()) {
            ("POST", "/auth/v1/token") if body["password"] == "correct horse battery" => {
                Json(serde_json::json!({
                    "access_token": "vendor-jwt",
                    "expires_in": 3600,
                    "user": { "id": VENDOR, "email": "owner@shop.vn" }
                }))
                .into_response()
            }
            ("POST", "/auth/v1/token") => (
                axum::http::StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid login credentials"
                })),
            )
                .into_response(),
            ("GET", "/rest/v1/orders") | ("PATCH", "/rest/v1/coupons") | ("DELETE", "/rest/v1/products") => {
                Json(serde_json::json!([])).into_response()
            }
            ("POST", "/rest/v1/rpc/get_revenue_summary") => Json(serde_json::json!([{
                "total_revenue": "1500000",
                "total_cost": "900000",
                "total_orders": 12,
                "average_order_value": "125000"
            }]))
            .into_response(),
            _ => axum::http::StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_backend() -> (BackendClient, Log) {
        let log = Log::default();
        let app = Router::new()
            .fallback(mock_backend)
            .with_state(log.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = BackendClient::new(&BackendConfig {
            url: Url::parse(&format!("http://{addr}/")).unwrap(),
            anon_key: SecretString::from("anon-key"),
        })
        .unwrap();
        (client, log)
    }

    fn last(log: &Log) -> Seen {
        log.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_sign_in() {
        let (client, log) = spawn_backend().await;
        let email = Email::parse("owner@shop.vn").unwrap();

        let session = client.sign_in(&email, "correct horse battery").await.unwrap();
        assert_eq!(session.access_token.expose(), "vendor-jwt");
        assert_eq!(session.user.id.to_string(), VENDOR);

        let seen = last(&log);
        assert_eq!(seen.param("grant_type"), Some("password"));
        assert_eq!(seen.apikey.as_deref(), Some("anon-key"));
        assert_eq!(seen.authorization, None);

        let err = client.sign_in(&email, "wrong").await.unwrap_err();
        assert!(
            matches!(&err, BackendError::Unauthorized(m) if m == "Invalid login credentials"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn test_list_orders_filters_by_status() {
        let (client, log) = spawn_backend().await;
        let token = AccessToken::new("vendor-jwt".to_string());
        let store = StoreId::random();

        let orders = client
            .list_orders(
                &token,
                store,
                &[DeliveryStatus::Confirmed, DeliveryStatus::DriverPickingUp],
            )
            .await
            .unwrap();
        assert!(orders.is_empty());

        let seen = last(&log);
        assert_eq!(seen.method, "GET");
        assert_eq!(seen.path, "/rest/v1/orders");
        assert_eq!(
            seen.param("status"),
            Some("in.(\"Confirmed\",\"Driver Picking Up\")")
        );
        assert_eq!(seen.param("store_id"), Some(eq(store).as_str()));
        assert_eq!(seen.param("select"), Some(ORDER_SELECT));
        assert_eq!(seen.apikey.as_deref(), Some("anon-key"));
        assert_eq!(seen.authorization.as_deref(), Some("Bearer vendor-jwt"));
    }

    #[tokio::test]
    async fn test_writes_with_no_rows_are_not_found() {
        let (client, log) = spawn_backend().await;
        let token = AccessToken::new("vendor-jwt".to_string());

        let update = CouponUpdate {
            usage_limit: Some(None),
            is_active: Some(false),
            ..CouponUpdate::default()
        };
        let err = client
            .update_coupon(&token, CouponId::random(), &update)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));

        let seen = last(&log);
        assert_eq!(seen.method, "PATCH");
        assert_eq!(seen.prefer.as_deref(), Some("return=representation"));
        assert_eq!(
            seen.body,
            serde_json::json!({ "usage_limit": null, "is_active": false })
        );

        let err = client
            .delete_product(&token, ProductId::random())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
        assert_eq!(last(&log).method, "DELETE");
    }

    #[tokio::test]
    async fn test_revenue_summary_takes_single_row() {
        let (client, log) = spawn_backend().await;
        let token = AccessToken::new("vendor-jwt".to_string());
        let store = StoreId::random();

        let summary = client.revenue_summary(&token, store, Some(30)).await.unwrap();
        assert_eq!(summary.total_orders, 12);
        assert_eq!(summary.total_revenue, Decimal::from(1_500_000));
        assert_eq!(summary.profit(), Decimal::from(600_000));

        let seen = last(&log);
        assert_eq!(seen.path, "/rest/v1/rpc/get_revenue_summary");
        assert_eq!(seen.body["p_store_id"], store.to_string());
        assert_eq!(seen.body["p_days"], 30);
    }
}
