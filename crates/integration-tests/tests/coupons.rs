//! Coupon validation happens before any backend call.

#![allow(clippy::unwrap_used)]

use vendor_hub_core::{CouponDraft, DiscountKind};
use vendor_hub_dashboard::backend::MemoryBackend;
use vendor_hub_dashboard::services::{CouponService, ServiceError};
use vendor_hub_integration_tests::Vendor;

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
async fn test_blank_code_or_value_makes_no_backend_call() {
    let backend = MemoryBackend::new();
    let vendor = Vendor::sign_up(&backend).await;
    let service = CouponService::new(&backend, &vendor.token);
    let before = backend.call_count();

    for bad in [draft("", "10"), draft("   ", "10"), draft("SALE10", ""), draft("SALE10", "  ")] {
        let err = service.create(vendor.store, &bad).await.unwrap_err();
        assert!(matches!(err, ServiceError::Coupon(_)));
    }
    assert_eq!(backend.call_count(), before);

    let coupon = service.create(vendor.store, &draft("sale10", "10")).await.unwrap();
    assert_eq!(coupon.code, "SALE10");
    assert!(backend.call_count() > before);
}
