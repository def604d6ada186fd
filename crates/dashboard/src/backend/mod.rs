//! Managed backend (auth, tables, RPC, object storage).
//!
//! Every business record the dashboard touches lives in the backend. The
//! [`Backend`] trait is the only way the rest of the crate reaches it:
//!
//! - [`BackendClient`] talks to the hosted backend over HTTP (PostgREST-style
//!   tables and RPC, password auth, object storage).
//! - [`MemoryBackend`] keeps everything in process and is used by tests and
//!   local demos.
//!
//! Table and RPC calls carry the signed-in vendor's [`AccessToken`] so that
//! the backend's row-level security decides what the vendor may see. Calls
//! are not retried.

pub mod client;
pub mod memory;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use vendor_hub_core::{
    CouponId, DeliveryStatus, Email, NotificationId, OrderId, ProductId, ReviewId, StoreId,
    VendorId,
};

use crate::models::{
    AuthSession, Coupon, CouponUpdate, DeliveryDetailsUpdate, MonthlyRevenue, NewCoupon,
    NewNotification, NewProduct, NewStore, Notification, Order, Product, ProductUpdate, Review,
    RevenueSummary, Store, StoreUpdate, TopProduct,
};

pub use client::BackendClient;
pub use memory::MemoryBackend;

/// Errors returned by a [`Backend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request. `message` is the backend's own
    /// message and is safe to show to the vendor.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Missing, expired or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The row does not exist or is hidden by row-level security.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The client could not be built from configuration.
    #[error("invalid backend configuration: {0}")]
    InvalidConfig(String),
}

impl BackendError {
    /// Whether the failure is on the backend's side rather than the request's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Decode(_) | Self::InvalidConfig(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Unauthorized(_) | Self::NotFound(_) => false,
        }
    }
}

/// Bearer token of a signed-in backend user.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: String) -> Self {
        Self(SecretString::from(token))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// Operations the dashboard needs from the backend.
#[async_trait]
pub trait Backend: Send + Sync {
    // Auth

    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, BackendError>;

    /// Revoke the session behind `token`.
    async fn sign_out(&self, token: &AccessToken) -> Result<(), BackendError>;

    // Stores

    async fn list_stores(
        &self,
        token: &AccessToken,
        vendor: VendorId,
    ) -> Result<Vec<Store>, BackendError>;

    async fn get_store(&self, token: &AccessToken, id: StoreId) -> Result<Store, BackendError>;

    async fn create_store(
        &self,
        token: &AccessToken,
        store: &NewStore,
    ) -> Result<Store, BackendError>;

    async fn update_store(
        &self,
        token: &AccessToken,
        id: StoreId,
        update: &StoreUpdate,
    ) -> Result<Store, BackendError>;

    // Products

    async fn list_products(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Product>, BackendError>;

    async fn get_product(&self, token: &AccessToken, id: ProductId)
    -> Result<Product, BackendError>;

    async fn create_product(
        &self,
        token: &AccessToken,
        product: &NewProduct,
    ) -> Result<Product, BackendError>;

    async fn update_product(
        &self,
        token: &AccessToken,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, BackendError>;

    async fn delete_product(&self, token: &AccessToken, id: ProductId)
    -> Result<(), BackendError>;

    // Orders

    /// Orders of a store, newest first. An empty `statuses` slice means all.
    async fn list_orders(
        &self,
        token: &AccessToken,
        store: StoreId,
        statuses: &[DeliveryStatus],
    ) -> Result<Vec<Order>, BackendError>;

    async fn get_order(&self, token: &AccessToken, id: OrderId) -> Result<Order, BackendError>;

    async fn update_order_status(
        &self,
        token: &AccessToken,
        id: OrderId,
        status: DeliveryStatus,
    ) -> Result<Order, BackendError>;

    async fn update_delivery_details(
        &self,
        token: &AccessToken,
        id: OrderId,
        update: &DeliveryDetailsUpdate,
    ) -> Result<Order, BackendError>;

    // Coupons

    async fn list_coupons(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Coupon>, BackendError>;

    async fn create_coupon(
        &self,
        token: &AccessToken,
        coupon: &NewCoupon,
    ) -> Result<Coupon, BackendError>;

    async fn update_coupon(
        &self,
        token: &AccessToken,
        id: CouponId,
        update: &CouponUpdate,
    ) -> Result<Coupon, BackendError>;

    async fn delete_coupon(&self, token: &AccessToken, id: CouponId) -> Result<(), BackendError>;

    // Reviews

    async fn list_reviews(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<Review>, BackendError>;

    async fn reply_to_review(
        &self,
        token: &AccessToken,
        id: ReviewId,
        reply: &str,
    ) -> Result<Review, BackendError>;

    // Notifications

    async fn list_notifications(
        &self,
        token: &AccessToken,
        user: Uuid,
        unread_only: bool,
    ) -> Result<Vec<Notification>, BackendError>;

    async fn create_notification(
        &self,
        token: &AccessToken,
        notification: &NewNotification,
    ) -> Result<Notification, BackendError>;

    async fn mark_notification_read(
        &self,
        token: &AccessToken,
        id: NotificationId,
    ) -> Result<Notification, BackendError>;

    /// Returns how many notifications changed.
    async fn mark_all_notifications_read(
        &self,
        token: &AccessToken,
        user: Uuid,
    ) -> Result<usize, BackendError>;

    // Reports (RPC)

    /// `get_revenue_summary`. `days` limits the window to the last N days.
    async fn revenue_summary(
        &self,
        token: &AccessToken,
        store: StoreId,
        days: Option<u32>,
    ) -> Result<RevenueSummary, BackendError>;

    /// `get_monthly_revenue`, oldest month first.
    async fn monthly_revenue(
        &self,
        token: &AccessToken,
        store: StoreId,
    ) -> Result<Vec<MonthlyRevenue>, BackendError>;

    /// `get_top_products`, best seller first.
    async fn top_products(
        &self,
        token: &AccessToken,
        store: StoreId,
        days: Option<u32>,
        limit: u32,
    ) -> Result<Vec<TopProduct>, BackendError>;

    // Storage

    /// Upload (or overwrite) an object and return its public URL.
    async fn upload_object(
        &self,
        token: &AccessToken,
        bucket: &str,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_debug_redacted() {
        let token = AccessToken::new("abc.def.ghi".to_string());
        assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
        assert_eq!(token.expose(), "abc.def.ghi");
    }

    #[test]
    fn test_server_error_classification() {
        let client_side = BackendError::Api {
            status: 409,
            message: "duplicate key value violates unique constraint".to_string(),
        };
        assert!(!client_side.is_server_error());
        assert_eq!(
            client_side.to_string(),
            "duplicate key value violates unique constraint"
        );

        let server_side = BackendError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        };
        assert!(server_side.is_server_error());
        assert!(!BackendError::NotFound("order".to_string()).is_server_error());
    }

    #[test]
    fn test_backend_is_object_safe() {
        fn assert_dyn(_: Option<&dyn Backend>) {}
        assert_dyn(None);
    }
}
