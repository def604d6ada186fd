//! Delivery status and the transition table vendors may drive.
//!
//! ```text
//! Pending ──(external)──> Confirmed ──> Driver Picking Up ──> Delivering ──> Delivered
//!                             └─────────────────────────────────^
//! Cancelled: terminal, set outside the vendor dashboard
//! ```
//!
//! Pending orders are confirmed by the checkout/payment flow, and
//! cancellation is owned by that flow too, so neither appears as a vendor
//! transition here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when applying a delivery transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("cannot move an order from {from} to {to}")]
    InvalidTransition {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },
    #[error("unknown delivery status: {0}")]
    UnknownStatus(String),
}

/// Lifecycle status of an order's delivery.
///
/// Serialized with the exact labels stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Pending,
    Confirmed,
    #[serde(rename = "Driver Picking Up")]
    DriverPickingUp,
    Delivering,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::DriverPickingUp,
        Self::Delivering,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Statuses shown in the active-deliveries view.
    pub const ACTIVE: [Self; 3] = [Self::Confirmed, Self::DriverPickingUp, Self::Delivering];

    /// Statuses the order may advance to next.
    #[must_use]
    pub const fn next_statuses(self) -> &'static [Self] {
        match self {
            Self::Confirmed => &[Self::DriverPickingUp, Self::Delivering],
            Self::DriverPickingUp => &[Self::Delivering],
            Self::Delivering => &[Self::Delivered],
            Self::Pending | Self::Delivered | Self::Cancelled => &[],
        }
    }

    /// Whether `next` is in this status's transition set.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Delivered and Cancelled never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an order in this status belongs in the active-deliveries view.
    #[must_use]
    pub const fn is_active_delivery(self) -> bool {
        matches!(
            self,
            Self::Confirmed | Self::DriverPickingUp | Self::Delivering
        )
    }

    /// The label stored by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::DriverPickingUp => "Driver Picking Up",
            Self::Delivering => "Delivering",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeliveryStatus {
    type Err = DeliveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DeliveryError::UnknownStatus(s.to_string()))
    }
}

/// Check a single transition against the table.
///
/// # Errors
///
/// Returns `DeliveryError::InvalidTransition` when `to` is not an allowed
/// next status of `from` (including `from == to`).
pub fn validate_transition(from: DeliveryStatus, to: DeliveryStatus) -> Result<(), DeliveryError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(DeliveryError::InvalidTransition { from, to })
    }
}
