//! Orders and their line items.
//!
//! Orders are created by the checkout flow, not by this service. The
//! dashboard only moves them through the delivery lifecycle and edits
//! delivery details.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vendor_hub_core::{CustomerId, DeliveryStatus, Email, OrderId, ProductId, Queued, StoreId};

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub store_id: StoreId,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<Email>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub total: Decimal,
    pub status: DeliveryStatus,
    /// Free-form tag; "Standard" and "Economy" feed the dispatch queues.
    #[serde(default)]
    pub shipping_method: String,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default, rename = "order_items")]
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line of an order, with product name and image captured at purchase time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

impl Queued for Order {
    fn delivery_status(&self) -> DeliveryStatus {
        self.status
    }

    fn shipping_method(&self) -> &str {
        &self.shipping_method
    }
}

/// Editable delivery fields of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetailsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl DeliveryDetailsUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.shipping_method.is_none()
            && self.shipping_address.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
    }
}

impl Order {
    /// Apply delivery-detail edits in place.
    pub fn apply(&mut self, update: DeliveryDetailsUpdate) {
        if let Some(method) = update.shipping_method {
            self.shipping_method = method;
        }
        if let Some(address) = update.shipping_address {
            self.shipping_address = Some(address);
        }
        if let Some(latitude) = update.latitude {
            self.latitude = Some(latitude);
        }
        if let Some(longitude) = update.longitude {
            self.longitude = Some(longitude);
        }
    }
}
