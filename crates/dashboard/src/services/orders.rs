//! Order status mutator.
//!
//! All vendor-driven status changes go through [`OrderService::change_status`],
//! which checks the transition table before anything is written. Orders are
//! never deleted; reaching Delivered only drops them out of the
//! active-deliveries view.

use serde::Serialize;
use tracing::instrument;

use vendor_hub_core::{
    Coordinates, DeliveryStatus, NotificationKind, OrderId, StoreId, delivery::validate_transition,
};

use super::{ServiceError, ValidationError};
use crate::backend::{AccessToken, Backend};
use crate::models::{DeliveryDetailsUpdate, NewNotification, Order};

/// Current status of an order and where it may go next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTransitions {
    pub order_id: OrderId,
    pub current: DeliveryStatus,
    pub next: Vec<DeliveryStatus>,
}

/// Result of a successful status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub order: Order,
    pub previous: DeliveryStatus,
    /// The order was in the active-deliveries view and no longer is.
    pub left_active_view: bool,
    /// Whether the customer notification was stored.
    pub customer_notified: bool,
}

/// Order operations made on behalf of one signed-in vendor.
pub struct OrderService<'a> {
    backend: &'a dyn Backend,
    token: &'a AccessToken,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, token: &'a AccessToken) -> Self {
        Self { backend, token }
    }

    /// Orders of a store, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the backend call fails.
    pub async fn list(
        &self,
        store: StoreId,
        statuses: &[DeliveryStatus],
    ) -> Result<Vec<Order>, ServiceError> {
        Ok(self.backend.list_orders(self.token, store, statuses).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the order does not exist or the call fails.
    pub async fn get(&self, order_id: OrderId) -> Result<Order, ServiceError> {
        Ok(self.backend.get_order(self.token, order_id).await?)
    }

    /// The order's current status and its allowed next statuses.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the order cannot be loaded.
    pub async fn transitions(&self, order_id: OrderId) -> Result<OrderTransitions, ServiceError> {
        let order = self.get(order_id).await?;
        Ok(OrderTransitions {
            order_id,
            current: order.status,
            next: order.status.next_statuses().to_vec(),
        })
    }

    /// Move an order to `next`.
    ///
    /// When `store_scope` is set the order must belong to that store. After
    /// the status is persisted the customer (if known) is notified; a failed
    /// notification is logged and does not undo the change.
    ///
    /// # Errors
    ///
    /// - `ServiceError::Transition` if `next` is not allowed from the current status
    /// - `ServiceError::OrderNotInStore` if the order belongs to another store
    /// - `ServiceError::Backend` if loading or saving the order fails
    #[instrument(skip(self), fields(order_id = %order_id, next = %next))]
    pub async fn change_status(
        &self,
        store_scope: Option<StoreId>,
        order_id: OrderId,
        next: DeliveryStatus,
    ) -> Result<StatusChange, ServiceError> {
        let current = self.get(order_id).await?;
        if store_scope.is_some_and(|store| store != current.store_id) {
            return Err(ServiceError::OrderNotInStore(order_id));
        }

        let previous = current.status;
        validate_transition(previous, next)?;

        let order = self
            .backend
            .update_order_status(self.token, order_id, next)
            .await?;
        tracing::info!(from = %previous, to = %next, "Order status changed");

        let customer_notified = self.notify_customer(&order).await;

        Ok(StatusChange {
            left_active_view: previous.is_active_delivery() && !next.is_active_delivery(),
            previous,
            order,
            customer_notified,
        })
    }

    async fn notify_customer(&self, order: &Order) -> bool {
        let Some(customer) = order.customer_id else {
            return false;
        };

        let notification = status_notification(order, customer.as_uuid());
        match self
            .backend
            .create_notification(self.token, &notification)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, order_id = %order.id, "Failed to notify customer");
                false
            }
        }
    }

    /// Edit shipping method, address or drop-off coordinates.
    ///
    /// `store_scope` works as in [`Self::change_status`].
    ///
    /// # Errors
    ///
    /// - `ServiceError::Validation` for an empty update, a blank shipping
    ///   method or invalid coordinates
    /// - `ServiceError::OrderNotInStore` if the order belongs to another store
    /// - `ServiceError::OrderClosed` if the order is Delivered or Cancelled
    /// - `ServiceError::Backend` if loading or saving the order fails
    #[instrument(skip(self, update), fields(order_id = %order_id))]
    pub async fn update_delivery_details(
        &self,
        store_scope: Option<StoreId>,
        order_id: OrderId,
        update: DeliveryDetailsUpdate,
    ) -> Result<Order, ServiceError> {
        let update = normalize_delivery_update(update)?;

        let order = self.get(order_id).await?;
        if store_scope.is_some_and(|store| store != order.store_id) {
            return Err(ServiceError::OrderNotInStore(order_id));
        }
        if order.status.is_terminal() {
            return Err(ServiceError::OrderClosed(order_id, order.status));
        }

        Ok(self
            .backend
            .update_delivery_details(self.token, order_id, &update)
            .await?)
    }
}

/// First eight hex digits of the order id, as shown to customers.
#[must_use]
pub fn order_number(id: OrderId) -> String {
    id.as_uuid()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect::<String>()
        .to_ascii_uppercase()
}

fn status_notification(order: &Order, customer: uuid::Uuid) -> NewNotification {
    let number = order_number(order.id);
    let (title, kind) = match order.status {
        DeliveryStatus::Delivered => ("Order delivered", NotificationKind::Success),
        DeliveryStatus::Cancelled => ("Order cancelled", NotificationKind::Warning),
        _ => ("Order update", NotificationKind::Info),
    };
    NewNotification {
        user_id: customer,
        title: title.to_string(),
        message: format!("Your order #{number} is now {}.", order.status),
        kind,
        link: Some(format!("/orders/{}", order.id)),
    }
}

fn normalize_delivery_update(
    mut update: DeliveryDetailsUpdate,
) -> Result<DeliveryDetailsUpdate, ValidationError> {
    if update.is_empty() {
        return Err(ValidationError::new("delivery", "nothing to update"));
    }

    if let Some(method) = update.shipping_method.take() {
        let method = method.trim();
        if method.is_empty() {
            return Err(ValidationError::new("shipping_method", "cannot be blank"));
        }
        update.shipping_method = Some(method.to_string());
    }

    if let Some(address) = update.shipping_address.take() {
        let address = address.trim();
        if address.is_empty() {
            return Err(ValidationError::new("shipping_address", "cannot be blank"));
        }
        update.shipping_address = Some(address.to_string());
    }

    Coordinates::from_parts(update.latitude, update.longitude)?;
    Ok(update)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::*;
    use crate::backend::MemoryBackend;
    use crate::services::test_support::vendor_with_store;

    fn order(store: StoreId, status: DeliveryStatus) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::random(),
            store_id: store,
            customer_id: None,
            customer_name: "Le Van C".to_string(),
            customer_email: None,
            customer_phone: None,
            total: Decimal::from(85_000),
            status,
            shipping_method: "Standard".to_string(),
            shipping_address: Some("45 Hai Ba Trung, Quan 3".to_string()),
            latitude: None,
            longitude: None,
            items: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    fn move_to_economy() -> DeliveryDetailsUpdate {
        DeliveryDetailsUpdate {
            shipping_method: Some(" Economy ".to_string()),
            latitude: Some(10.7798),
            longitude: Some(106.6990),
            ..DeliveryDetailsUpdate::default()
        }
    }

    #[tokio::test]
    async fn test_delivery_details_edit_persists() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let confirmed = order(store, DeliveryStatus::Confirmed);
        backend.seed_order(confirmed.clone()).await;
        let service = OrderService::new(&backend, &token);

        let updated = service
            .update_delivery_details(Some(store), confirmed.id, move_to_economy())
            .await
            .unwrap();
        assert_eq!(updated.shipping_method, "Economy");
        assert_eq!(updated.status, DeliveryStatus::Confirmed);

        let stored = backend.stored_order(confirmed.id).await.unwrap();
        assert_eq!(stored.shipping_method, "Economy");
        assert_eq!(stored.latitude, Some(10.7798));
        assert_eq!(stored.shipping_address, confirmed.shipping_address);
    }

    #[tokio::test]
    async fn test_delivery_details_rejected_on_closed_orders() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let service = OrderService::new(&backend, &token);

        for status in [DeliveryStatus::Delivered, DeliveryStatus::Cancelled] {
            let closed = order(store, status);
            backend.seed_order(closed.clone()).await;
            let err = service
                .update_delivery_details(None, closed.id, move_to_economy())
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::OrderClosed(id, s) if id == closed.id && s == status));
            let stored = backend.stored_order(closed.id).await.unwrap();
            assert_eq!(stored.shipping_method, "Standard");
        }
    }

    #[tokio::test]
    async fn test_delivery_details_scoped_to_store() {
        let backend = MemoryBackend::new();
        let (_, token, store) = vendor_with_store(&backend).await;
        let confirmed = order(store, DeliveryStatus::Confirmed);
        backend.seed_order(confirmed.clone()).await;
        let service = OrderService::new(&backend, &token);

        let err = service
            .update_delivery_details(Some(StoreId::random()), confirmed.id, move_to_economy())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::OrderNotInStore(id) if id == confirmed.id));

        let err = service
            .change_status(Some(StoreId::random()), confirmed.id, DeliveryStatus::Delivering)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::OrderNotInStore(_)));
        let stored = backend.stored_order(confirmed.id).await.unwrap();
        assert_eq!(stored.shipping_method, "Standard");
        assert_eq!(stored.status, DeliveryStatus::Confirmed);
    }

    #[test]
    fn test_order_number() {
        let id = OrderId::new(uuid::Uuid::parse_str("7d4f0c1a-2b3c-4d5e-8f90-a1b2c3d4e5f6").unwrap());
        assert_eq!(order_number(id), "7D4F0C1A");
    }

    #[test]
    fn test_normalize_delivery_update() {
        assert!(normalize_delivery_update(DeliveryDetailsUpdate::default()).is_err());

        let update = normalize_delivery_update(DeliveryDetailsUpdate {
            shipping_method: Some("  Economy ".to_string()),
            ..DeliveryDetailsUpdate::default()
        })
        .unwrap();
        assert_eq!(update.shipping_method.as_deref(), Some("Economy"));

        let err = normalize_delivery_update(DeliveryDetailsUpdate {
            latitude: Some(10.77),
            ..DeliveryDetailsUpdate::default()
        })
        .unwrap_err();
        assert_eq!(err.field, "coordinates");

        let err = normalize_delivery_update(DeliveryDetailsUpdate {
            latitude: Some(100.0),
            longitude: Some(106.7),
            ..DeliveryDetailsUpdate::default()
        })
        .unwrap_err();
        assert_eq!(err.field, "coordinates");

        let err = normalize_delivery_update(DeliveryDetailsUpdate {
            shipping_method: Some("   ".to_string()),
            ..DeliveryDetailsUpdate::default()
        })
        .unwrap_err();
        assert_eq!(err.field, "shipping_method");
    }
}
