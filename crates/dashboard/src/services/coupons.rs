//! Store coupons.
//!
//! Drafts are validated before any backend call, so a blank code or blank
//! value never leaves the service.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use vendor_hub_core::{CouponDraft, CouponId, StoreId};

use super::{ServiceError, ValidationError};
use crate::backend::{AccessToken, Backend};
use crate::models::{Coupon, CouponUpdate, NewCoupon};

/// What a coupon form would take off a cart subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponPreview {
    pub code: String,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Price `subtotal` with the coupon described by `draft`.
///
/// Pure; the draft is validated the same way as on create.
///
/// # Errors
///
/// Returns `ServiceError::Coupon` for an invalid draft, or
/// `ServiceError::Validation` for a negative subtotal.
pub fn preview(draft: &CouponDraft, subtotal: Decimal) -> Result<CouponPreview, ServiceError> {
    if subtotal < Decimal::ZERO {
        return Err(ValidationError::new("subtotal", "cannot be negative").into());
    }
    let coupon = draft.validate()?;
    let discount = coupon.discount_for(subtotal);
    Ok(CouponPreview {
        code: coupon.code,
        subtotal,
        discount,
        total: subtotal - discount,
    })
}

pub struct CouponService<'a> {
    backend: &'a dyn Backend,
    token: &'a AccessToken,
}

impl<'a> CouponService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, token: &'a AccessToken) -> Self {
        Self { backend, token }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the backend call fails.
    pub async fn list(&self, store: StoreId) -> Result<Vec<Coupon>, ServiceError> {
        Ok(self.backend.list_coupons(self.token, store).await?)
    }

    /// Validate `draft` and create the coupon.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Coupon` if the draft is invalid (no backend call is made)
    /// - `ServiceError::Backend` if the backend rejects it, e.g. a duplicate code
    #[instrument(skip(self, draft), fields(store_id = %store))]
    pub async fn create(&self, store: StoreId, draft: &CouponDraft) -> Result<Coupon, ServiceError> {
        let valid = draft.validate()?;
        let coupon = self
            .backend
            .create_coupon(self.token, &NewCoupon::from_valid(store, valid))
            .await?;
        tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon created");
        Ok(coupon)
    }

    /// Replace a coupon's settings with a validated draft.
    ///
    /// Every setting is written, so a usage limit or validity bound the
    /// draft leaves out is cleared on the stored coupon.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create`].
    #[instrument(skip(self, draft), fields(coupon_id = %id))]
    pub async fn update(&self, id: CouponId, draft: &CouponDraft) -> Result<Coupon, ServiceError> {
        let valid = draft.validate()?;
        Ok(self
            .backend
            .update_coupon(self.token, id, &CouponUpdate::from(valid))
            .await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the coupon does not exist or the call fails.
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn set_active(&self, id: CouponId, active: bool) -> Result<Coupon, ServiceError> {
        let update = CouponUpdate {
            is_active: Some(active),
            ..CouponUpdate::default()
        };
        Ok(self.backend.update_coupon(self.token, id, &update).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the coupon does not exist or the call fails.
    #[instrument(skip(self), fields(coupon_id = %id))]
    pub async fn delete(&self, id: CouponId) -> Result<(), ServiceError> {
        self.backend.delete_coupon(self.token, id).await?;
        tracing::info!("Coupon deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use vendor_hub_core::{CouponError, DiscountKind};

    use super::*;
    use crate::backend::{BackendError, MemoryBackend};
    use crate::services::test_support::vendor_with_store;

    fn draft(code: &str, value: &str) -> CouponDraft {
        CouponDraft {
            code: code.to_string(),
            discount_kind: Some(DiscountKind::Percentage),
            value: value.to_string(),
            is_active: true,
            ..CouponDraft::default()
        }
    }

    #[tokio::test]
    async fn test_blank_fields_never_reach_backend() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let before = backend.call_count();
        let service = CouponService::new(&backend, &token);

        let err = service.create(store, &draft("   ", "10")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Coupon(CouponError::MissingCode)));

        let err = service.create(store, &draft("SALE10", "")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Coupon(CouponError::MissingValue)));

        assert_eq!(backend.call_count(), before);
    }

    #[tokio::test]
    async fn test_create_toggle_delete() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let service = CouponService::new(&backend, &token);

        let coupon = service.create(store, &draft(" sale10 ", "10")).await.unwrap();
        assert_eq!(coupon.code, "SALE10");
        assert_eq!(coupon.value, Decimal::from(10));
        assert!(coupon.is_active);

        let coupon = service.set_active(coupon.id, false).await.unwrap();
        assert!(!coupon.is_active);

        service.delete(coupon.id).await.unwrap();
        assert!(service.list(store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_code_surfaces_backend_message() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let service = CouponService::new(&backend, &token);

        service.create(store, &draft("SALE10", "10")).await.unwrap();
        let err = service.create(store, &draft("sale10", "15")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Backend(BackendError::Api { status: 409, .. })
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_limit_and_window() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let service = CouponService::new(&backend, &token);
        let now = Utc::now();

        let mut limited = draft("TET2026", "15");
        limited.usage_limit = Some(5);
        limited.starts_at = Some(now + Duration::days(10));
        limited.ends_at = Some(now + Duration::days(20));
        let coupon = service.create(store, &limited).await.unwrap();
        assert_eq!(coupon.usage_limit, Some(5));

        let mut replacement = draft("TET2026", "20");
        replacement.ends_at = Some(now + Duration::days(2));
        let updated = service.update(coupon.id, &replacement).await.unwrap();

        assert_eq!(updated.value, Decimal::from(20));
        assert_eq!(updated.usage_limit, None);
        assert_eq!(updated.starts_at, None);
        assert_eq!(updated.ends_at, replacement.ends_at);

        let stored = service.list(store).await.unwrap();
        assert_eq!(stored, vec![updated]);
    }

    #[tokio::test]
    async fn test_toggle_keeps_other_settings() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let service = CouponService::new(&backend, &token);

        let mut limited = draft("FLASH", "10");
        limited.usage_limit = Some(3);
        let coupon = service.create(store, &limited).await.unwrap();

        let toggled = service.set_active(coupon.id, false).await.unwrap();
        assert!(!toggled.is_active);
        assert_eq!(toggled.usage_limit, Some(3));
    }

    #[test]
    fn test_preview() {
        let mut d = draft("sale20", "20");
        d.min_spend = Some(Decimal::from(100_000));

        let below = preview(&d, Decimal::from(80_000)).unwrap();
        assert_eq!(below.discount, Decimal::ZERO);
        assert_eq!(below.total, Decimal::from(80_000));

        let above = preview(&d, Decimal::from(250_000)).unwrap();
        assert_eq!(above.code, "SALE20");
        assert_eq!(above.discount, Decimal::from(50_000));
        assert_eq!(above.total, Decimal::from(200_000));

        assert!(matches!(
            preview(&d, Decimal::from(-1)),
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            preview(&draft("", "20"), Decimal::ONE),
            Err(ServiceError::Coupon(CouponError::MissingCode))
        ));
    }
}
