//! Order status flow through the service layer.

#![allow(clippy::unwrap_used)]

use vendor_hub_core::DeliveryStatus;
use vendor_hub_dashboard::backend::MemoryBackend;
use vendor_hub_dashboard::services::{DeliveryService, OrderService, ServiceError};
use vendor_hub_integration_tests::{Vendor, order};

#[tokio::test]
async fn test_full_delivery_leaves_active_view_but_not_storage() {
    let backend = MemoryBackend::new();
    let vendor = Vendor::sign_up(&backend).await;
    let placed = order(vendor.store, DeliveryStatus::Confirmed, "Express");
    let customer = placed.customer_id.unwrap();
    backend.seed_order(placed.clone()).await;

    let orders = OrderService::new(&backend, &vendor.token);
    let deliveries = DeliveryService::new(&backend, &vendor.token);

    for next in [
        DeliveryStatus::DriverPickingUp,
        DeliveryStatus::Delivering,
        DeliveryStatus::Delivered,
    ] {
        let change = orders
            .change_status(Some(vendor.store), placed.id, next)
            .await
            .unwrap();
        assert_eq!(change.order.status, next);
        assert!(change.customer_notified);
        assert_eq!(change.left_active_view, next == DeliveryStatus::Delivered);
    }

    let board = deliveries.board(vendor.store).await.unwrap();
    assert!(board.in_progress.is_empty());

    let stored = backend.stored_order(placed.id).await.unwrap();
    assert_eq!(stored.status, DeliveryStatus::Delivered);
    assert_eq!(
        backend.stored_notifications(customer.as_uuid()).await.len(),
        3
    );

    let transitions = orders.transitions(placed.id).await.unwrap();
    assert!(transitions.next.is_empty());
}

#[tokio::test]
async fn test_skipping_and_reversing_are_rejected() {
    let backend = MemoryBackend::new();
    let vendor = Vendor::sign_up(&backend).await;
    let placed = order(vendor.store, DeliveryStatus::Delivering, "Standard");
    backend.seed_order(placed.clone()).await;
    let orders = OrderService::new(&backend, &vendor.token);

    for next in [
        DeliveryStatus::Confirmed,
        DeliveryStatus::DriverPickingUp,
        DeliveryStatus::Delivering,
        DeliveryStatus::Cancelled,
    ] {
        let err = orders
            .change_status(None, placed.id, next)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Transition(_)), "{next}");
    }
    let stored = backend.stored_order(placed.id).await.unwrap();
    assert_eq!(stored.status, DeliveryStatus::Delivering);
}

#[tokio::test]
async fn test_other_vendor_cannot_move_order() {
    let backend = MemoryBackend::new();
    let owner = Vendor::sign_up(&backend).await;
    let stranger = Vendor::sign_up(&backend).await;
    let placed = order(owner.store, DeliveryStatus::Confirmed, "Standard");
    backend.seed_order(placed.clone()).await;

    let result = OrderService::new(&backend, &stranger.token)
        .change_status(None, placed.id, DeliveryStatus::Delivering)
        .await;
    assert!(result.is_err());

    let stored = backend.stored_order(placed.id).await.unwrap();
    assert_eq!(stored.status, DeliveryStatus::Confirmed);
}
