//! Business logic services for the vendor dashboard.
//!
//! Every service borrows the backend and the signed-in vendor's access token,
//! so each call it makes is subject to the backend's row-level security.
//!
//! # Services
//!
//! - `orders` - Order status mutator and delivery-detail edits
//! - `deliveries` - Active-deliveries board and queue dispatch
//! - `coupons` - Coupon validation and CRUD
//! - `catalog` - Stores, products and image uploads
//! - `reviews` - Review listing and vendor replies
//! - `notifications` - In-app notification inbox
//! - `reports` - Revenue and product reports

pub mod catalog;
pub mod coupons;
pub mod deliveries;
pub mod error;
pub mod notifications;
pub mod orders;
pub mod reports;
pub mod reviews;

pub use catalog::{CatalogService, ImageKind, ImageUpload, ProductDraft, StoreDraft};
pub use coupons::{CouponPreview, CouponService};
pub use deliveries::{DeliveryBoard, DeliveryService, DispatchOutcome, TierQueue};
pub use error::{ServiceError, ValidationError};
pub use notifications::NotificationService;
pub use orders::{OrderService, OrderTransitions, StatusChange, order_number};
pub use reports::{ReportService, ReportSummary};
pub use reviews::ReviewService;

#[cfg(test)]
pub(crate) mod test_support {
    use vendor_hub_core::{Email, StoreId, StoreStatus, VendorId};

    use crate::backend::{AccessToken, Backend, MemoryBackend};
    use crate::models::{NewStore, SocialLinks};

    /// A signed-in vendor owning one empty store.
    #[allow(clippy::unwrap_used)]
    pub async fn vendor_with_store(backend: &MemoryBackend) -> (VendorId, AccessToken, StoreId) {
        let email = Email::parse(&format!("{}@shop.vn", uuid::Uuid::new_v4().simple())).unwrap();
        let vendor = backend.register_user(&email, "hunter2-but-longer").await;
        let token = backend.issue_token(vendor).await;
        let store = backend
            .create_store(
                &token,
                &NewStore {
                    vendor_id: vendor,
                    name: "Bep Nha Minh".to_string(),
                    description: None,
                    status: StoreStatus::Active,
                    address: None,
                    latitude: None,
                    longitude: None,
                    categories: vec![],
                    social_links: SocialLinks::default(),
                },
            )
            .await
            .unwrap();
        (vendor, token, store.id)
    }
}
