//! Service-layer error types.

use thiserror::Error;

use vendor_hub_core::{
    CoordinateError, CouponError, DeliveryError, DeliveryStatus, OrderId, QueueTier,
};

use crate::backend::BackendError;

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl From<CoordinateError> for ValidationError {
    fn from(err: CoordinateError) -> Self {
        Self::new("coordinates", err.to_string())
    }
}

/// Errors that can occur in the dashboard services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Input failed validation before reaching the backend.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Requested status change is not in the transition table.
    #[error(transparent)]
    Transition(#[from] DeliveryError),

    /// Coupon draft failed validation before reaching the backend.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// The tier has fewer orders than its minimum batch.
    #[error("{tier} queue is not ready: {count} of {min_batch} orders")]
    QueueNotReady {
        tier: QueueTier,
        count: usize,
        min_batch: u32,
    },

    /// Delivery details of a finished order cannot change.
    #[error("order {0} is {1} and can no longer be edited")]
    OrderClosed(OrderId, DeliveryStatus),

    /// The order belongs to a different store than the one being managed.
    #[error("order {0} not found in this store")]
    OrderNotInStore(OrderId),
}
