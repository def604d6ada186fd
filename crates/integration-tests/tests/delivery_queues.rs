//! Standard/Economy queue readiness and dispatch.

#![allow(clippy::unwrap_used)]

use vendor_hub_core::{DeliveryStatus, QueueTier};
use vendor_hub_dashboard::backend::MemoryBackend;
use vendor_hub_dashboard::services::{DeliveryService, ServiceError};
use vendor_hub_integration_tests::{Vendor, seed_orders};

fn readiness(board: &vendor_hub_dashboard::services::DeliveryBoard, tier: QueueTier) -> u8 {
    board
        .queues
        .iter()
        .find(|q| q.summary.tier == tier)
        .unwrap()
        .summary
        .readiness_percent
}

#[tokio::test]
async fn test_readiness_is_clamped() {
    let backend = MemoryBackend::new();
    let vendor = Vendor::sign_up(&backend).await;
    let service = DeliveryService::new(&backend, &vendor.token);

    seed_orders(&backend, vendor.store, DeliveryStatus::Confirmed, "Standard", 5).await;
    let board = service.board(vendor.store).await.unwrap();
    assert_eq!(readiness(&board, QueueTier::Standard), 50);
    assert_eq!(readiness(&board, QueueTier::Economy), 0);

    seed_orders(&backend, vendor.store, DeliveryStatus::Confirmed, "Standard", 25).await;
    let board = service.board(vendor.store).await.unwrap();
    assert_eq!(readiness(&board, QueueTier::Standard), 100);
}

#[tokio::test]
async fn test_economy_dispatches_at_threshold() {
    let backend = MemoryBackend::new();
    let vendor = Vendor::sign_up(&backend).await;
    let service = DeliveryService::new(&backend, &vendor.token);
    let mut ids = seed_orders(&backend, vendor.store, DeliveryStatus::Confirmed, "Economy", 24).await;
    // Pending orders are not queued yet.
    seed_orders(&backend, vendor.store, DeliveryStatus::Pending, "Economy", 3).await;

    let err = service
        .dispatch(vendor.store, QueueTier::Economy)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::QueueNotReady { count: 24, min_batch: 25, .. }));

    ids.extend(seed_orders(&backend, vendor.store, DeliveryStatus::Confirmed, "Economy", 1).await);
    let outcome = service
        .dispatch(vendor.store, QueueTier::Economy)
        .await
        .unwrap();
    assert_eq!(outcome.dispatched.len(), 25);
    assert!(outcome.failed.is_empty());
    for id in ids {
        let stored = backend.stored_order(id).await.unwrap();
        assert_eq!(stored.status, DeliveryStatus::DriverPickingUp);
    }
}
