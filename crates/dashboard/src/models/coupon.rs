//! Coupon rows and payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use vendor_hub_core::{CouponId, DiscountKind, StoreId, ValidCoupon};

/// A store coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub store_id: StoreId,
    pub code: String,
    pub discount_type: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_spend: Decimal,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub usage_count: i32,
    pub is_active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a coupon. Only built from a validated draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCoupon {
    pub store_id: StoreId,
    pub code: String,
    pub discount_type: DiscountKind,
    pub value: Decimal,
    pub min_spend: Decimal,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl NewCoupon {
    #[must_use]
    pub fn from_valid(store_id: StoreId, coupon: ValidCoupon) -> Self {
        Self {
            store_id,
            code: coupon.code,
            discount_type: coupon.discount_kind,
            value: coupon.value,
            min_spend: coupon.min_spend,
            usage_limit: coupon.usage_limit,
            is_active: coupon.is_active,
            starts_at: coupon.starts_at,
            ends_at: coupon.ends_at,
        }
    }
}

/// Partial update for a coupon.
///
/// Nullable columns use a nested `Option`: `None` leaves the column alone and
/// `Some(None)` is sent as `null` to clear it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CouponUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_spend: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<Option<i32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<Option<DateTime<Utc>>>,
}

/// A validated draft replaces every setting, clearing the limit and window
/// when the draft leaves them out.
impl From<ValidCoupon> for CouponUpdate {
    fn from(coupon: ValidCoupon) -> Self {
        Self {
            code: Some(coupon.code),
            discount_type: Some(coupon.discount_kind),
            value: Some(coupon.value),
            min_spend: Some(coupon.min_spend),
            usage_limit: Some(coupon.usage_limit),
            is_active: Some(coupon.is_active),
            starts_at: Some(coupon.starts_at),
            ends_at: Some(coupon.ends_at),
        }
    }
}

impl Coupon {
    /// Apply a partial update in place.
    pub fn apply(&mut self, update: CouponUpdate) {
        if let Some(code) = update.code {
            self.code = code;
        }
        if let Some(kind) = update.discount_type {
            self.discount_type = kind;
        }
        if let Some(value) = update.value {
            self.value = value;
        }
        if let Some(min_spend) = update.min_spend {
            self.min_spend = min_spend;
        }
        if let Some(limit) = update.usage_limit {
            self.usage_limit = limit;
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        if let Some(starts_at) = update.starts_at {
            self.starts_at = starts_at;
        }
        if let Some(ends_at) = update.ends_at {
            self.ends_at = ends_at;
        }
    }
}
