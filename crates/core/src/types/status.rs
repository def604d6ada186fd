//! Status and kind enums for stores, notifications, coupons and vehicles.
//!
//! Delivery statuses live in [`crate::delivery`] because they carry the
//! transition table.

use serde::{Deserialize, Serialize};

/// Store availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

impl StoreStatus {
    /// Whether customers can place orders with the store.
    #[must_use]
    pub const fn accepts_orders(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Severity/kind of an in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// How a coupon discount is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// Value is a percentage of the subtotal (0, 100].
    Percentage,
    /// Value is a flat amount off the subtotal.
    FixedAmount,
}

/// Vehicle used for self-delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bike,
    Car,
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bike => write!(f, "bike"),
            Self::Car => write!(f, "car"),
        }
    }
}

impl std::str::FromStr for VehicleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bike" => Ok(Self::Bike),
            "car" => Ok(Self::Car),
            _ => Err(format!("invalid vehicle type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&StoreStatus::Maintenance).unwrap(),
            "\"maintenance\""
        );
        assert!(StoreStatus::Active.accepts_orders());
        assert!(!StoreStatus::Maintenance.accepts_orders());
    }

    #[test]
    fn test_vehicle_type_parse() {
        assert_eq!("bike".parse::<VehicleType>().unwrap(), VehicleType::Bike);
        assert!("truck".parse::<VehicleType>().is_err());
    }

    #[test]
    fn test_discount_kind_wire_format() {
        let kind: DiscountKind = serde_json::from_str("\"fixed_amount\"").unwrap();
        assert_eq!(kind, DiscountKind::FixedAmount);
    }
}
