//! Active deliveries and the Standard/Economy dispatch queues.

use serde::Serialize;
use tracing::instrument;

use vendor_hub_core::{
    DeliveryStatus, OrderId, QueueBoard, QueueSummary, QueueTier, Queued, StoreId,
};

use super::ServiceError;
use super::orders::OrderService;
use crate::backend::{AccessToken, Backend};
use crate::models::Order;

/// One tier's queue with the orders waiting in it.
#[derive(Debug, Clone, Serialize)]
pub struct TierQueue {
    #[serde(flatten)]
    pub summary: QueueSummary,
    pub orders: Vec<Order>,
}

/// Everything the active-deliveries screen shows.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryBoard {
    /// Active orders that are not waiting in a tier queue: picked up,
    /// delivering, or confirmed with a non-queued shipping method.
    pub in_progress: Vec<Order>,
    /// Standard first, then Economy.
    pub queues: Vec<TierQueue>,
}

/// Failure to advance one order during a dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchFailure {
    pub order_id: OrderId,
    pub error: String,
}

/// Outcome of dispatching a tier.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub tier: QueueTier,
    pub dispatched: Vec<OrderId>,
    pub failed: Vec<DispatchFailure>,
}

pub struct DeliveryService<'a> {
    backend: &'a dyn Backend,
    token: &'a AccessToken,
}

impl<'a> DeliveryService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, token: &'a AccessToken) -> Self {
        Self { backend, token }
    }

    /// Build the active-deliveries board for a store.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the orders cannot be fetched.
    #[instrument(skip(self), fields(store_id = %store))]
    pub async fn board(&self, store: StoreId) -> Result<DeliveryBoard, ServiceError> {
        let orders = self
            .backend
            .list_orders(self.token, store, &DeliveryStatus::ACTIVE)
            .await?;
        Ok(build_board(&orders))
    }

    /// Promote a ready tier: every Confirmed order in it moves to Driver
    /// Picking Up.
    ///
    /// Orders are advanced one at a time through [`OrderService::change_status`].
    /// A failure on one order is recorded and the rest still go out.
    ///
    /// # Errors
    ///
    /// - `ServiceError::QueueNotReady` if the tier is below its minimum batch
    /// - `ServiceError::Backend` if the queue cannot be fetched
    #[instrument(skip(self), fields(store_id = %store, tier = %tier))]
    pub async fn dispatch(
        &self,
        store: StoreId,
        tier: QueueTier,
    ) -> Result<DispatchOutcome, ServiceError> {
        let confirmed = self
            .backend
            .list_orders(self.token, store, &[DeliveryStatus::Confirmed])
            .await?;
        let board = QueueBoard::classify(&confirmed);
        if !board.is_ready(tier) {
            return Err(ServiceError::QueueNotReady {
                tier,
                count: board.count(tier),
                min_batch: tier.min_batch(),
            });
        }

        let orders = OrderService::new(self.backend, self.token);
        let mut outcome = DispatchOutcome {
            tier,
            dispatched: Vec::new(),
            failed: Vec::new(),
        };
        for order in board.orders(tier) {
            match orders
                .change_status(Some(store), order.id, DeliveryStatus::DriverPickingUp)
                .await
            {
                Ok(_) => outcome.dispatched.push(order.id),
                Err(e) => {
                    tracing::warn!(order_id = %order.id, error = %e, "Dispatch failed for order");
                    outcome.failed.push(DispatchFailure {
                        order_id: order.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            dispatched = outcome.dispatched.len(),
            failed = outcome.failed.len(),
            "Queue dispatched"
        );
        Ok(outcome)
    }
}

fn build_board(orders: &[Order]) -> DeliveryBoard {
    let board = QueueBoard::classify(orders);
    let queues = QueueTier::ALL
        .into_iter()
        .map(|tier| TierQueue {
            summary: board.summary(tier),
            orders: board.orders(tier).iter().map(|o| (*o).clone()).collect(),
        })
        .collect();

    let in_progress = orders
        .iter()
        .filter(|o| o.status.is_active_delivery() && !is_queued(o))
        .cloned()
        .collect();

    DeliveryBoard {
        in_progress,
        queues,
    }
}

fn is_queued(order: &Order) -> bool {
    order.status == DeliveryStatus::Confirmed
        && QueueTier::from_shipping_method(order.shipping_method()).is_some()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use vendor_hub_core::CustomerId;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::services::test_support::vendor_with_store;

    fn order(status: DeliveryStatus, method: &str) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::random(),
            store_id: StoreId::random(),
            customer_id: None,
            customer_name: "Le Van C".to_string(),
            customer_email: None,
            customer_phone: None,
            total: Decimal::from(50),
            status,
            shipping_method: method.to_string(),
            shipping_address: None,
            latitude: None,
            longitude: None,
            items: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_build_board() {
        let mut orders: Vec<Order> = (0..5)
            .map(|_| order(DeliveryStatus::Confirmed, "Standard"))
            .collect();
        orders.push(order(DeliveryStatus::Confirmed, "Economy"));
        orders.push(order(DeliveryStatus::Confirmed, "Express"));
        orders.push(order(DeliveryStatus::DriverPickingUp, "Standard"));
        orders.push(order(DeliveryStatus::Delivering, "Economy"));

        let board = build_board(&orders);
        assert_eq!(board.in_progress.len(), 3);

        let standard = &board.queues[0];
        assert_eq!(standard.summary.tier, QueueTier::Standard);
        assert_eq!(standard.summary.count, 5);
        assert_eq!(standard.summary.readiness_percent, 50);
        assert_eq!(standard.orders.len(), 5);

        let economy = &board.queues[1];
        assert_eq!(economy.summary.count, 1);
        assert_eq!(economy.summary.readiness_percent, 4);
        assert!(!economy.summary.ready);
    }

    #[test]
    fn test_board_serializes_flat_summary() {
        let board = build_board(&[order(DeliveryStatus::Confirmed, "Standard")]);
        let json = serde_json::to_value(&board.queues[0]).unwrap_or_default();
        assert_eq!(json["tier"], "standard");
        assert_eq!(json["readiness_percent"], 10);
        assert_eq!(json["min_batch"], 10);
    }

    #[tokio::test]
    async fn test_dispatch_ready_tier() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let customer = CustomerId::random();
        let mut ids = Vec::new();
        for _ in 0..10 {
            let mut o = order(DeliveryStatus::Confirmed, "Standard");
            o.store_id = store;
            o.customer_id = Some(customer);
            ids.push(o.id);
            backend.seed_order(o).await;
        }

        let service = DeliveryService::new(&backend, &token);
        let outcome = service.dispatch(store, QueueTier::Standard).await.unwrap();
        assert_eq!(outcome.dispatched.len(), 10);
        assert!(outcome.failed.is_empty());

        for id in ids {
            let stored = backend.stored_order(id).await.unwrap();
            assert_eq!(stored.status, DeliveryStatus::DriverPickingUp);
        }
        assert_eq!(
            backend.stored_notifications(customer.as_uuid()).await.len(),
            10
        );

        let board = service.board(store).await.unwrap();
        assert_eq!(board.in_progress.len(), 10);
        assert_eq!(board.queues[0].summary.count, 0);
    }

    #[tokio::test]
    async fn test_dispatch_not_ready() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        for _ in 0..24 {
            let mut o = order(DeliveryStatus::Confirmed, "Economy");
            o.store_id = store;
            backend.seed_order(o).await;
        }

        let err = DeliveryService::new(&backend, &token)
            .dispatch(store, QueueTier::Economy)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::QueueNotReady {
                tier: QueueTier::Economy,
                count: 24,
                min_batch: 25
            }
        ));
    }
}
