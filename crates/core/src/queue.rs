//! Self-delivery dispatch queues.
//!
//! Confirmed orders are batched by shipping method. Each tier has a minimum
//! batch size; once a tier's bucket reaches it the batch is ready to dispatch.
//!
//! | Tier     | Shipping method | Minimum batch |
//! |----------|-----------------|---------------|
//! | Standard | `"Standard"`    | 10            |
//! | Economy  | `"Economy"`     | 25            |

use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryStatus;

/// A self-delivery batching class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueTier {
    Standard,
    Economy,
}

impl QueueTier {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Economy];

    /// Orders needed before the tier is ready to dispatch.
    #[must_use]
    pub const fn min_batch(self) -> u32 {
        match self {
            Self::Standard => 10,
            Self::Economy => 25,
        }
    }

    /// The shipping-method tag that puts an order in this tier.
    #[must_use]
    pub const fn shipping_method(self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Economy => "Economy",
        }
    }

    /// Classify a shipping-method tag. Anything other than the two tier tags
    /// (e.g. "Express") is not queued.
    #[must_use]
    pub fn from_shipping_method(method: &str) -> Option<Self> {
        let method = method.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.shipping_method() == method)
    }
}

impl std::fmt::Display for QueueTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.shipping_method())
    }
}

impl std::str::FromStr for QueueTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "economy" => Ok(Self::Economy),
            _ => Err(format!("invalid queue tier: {s}")),
        }
    }
}

/// Dispatch readiness of a bucket, as a whole percentage clamped to 100.
#[must_use]
pub fn readiness_percent(count: usize, tier: QueueTier) -> u8 {
    let min = u64::from(tier.min_batch());
    let count = u64::try_from(count).unwrap_or(u64::MAX);
    let percent = count.saturating_mul(100) / min;
    u8::try_from(percent.min(100)).unwrap_or(100)
}

/// Anything that can sit in a dispatch queue.
pub trait Queued {
    fn delivery_status(&self) -> DeliveryStatus;
    fn shipping_method(&self) -> &str;
}

/// Per-tier view of a queue, ready to serialize for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub tier: QueueTier,
    pub count: usize,
    pub min_batch: u32,
    pub readiness_percent: u8,
    pub ready: bool,
}

/// Confirmed orders partitioned into Standard and Economy buckets.
#[derive(Debug)]
pub struct QueueBoard<'a, T> {
    standard: Vec<&'a T>,
    economy: Vec<&'a T>,
}

impl<'a, T: Queued> QueueBoard<'a, T> {
    /// Partition `orders`. Only Confirmed orders are queued; orders already
    /// picked up or delivering have left the queue.
    pub fn classify(orders: impl IntoIterator<Item = &'a T>) -> Self {
        let mut board = Self {
            standard: Vec::new(),
            economy: Vec::new(),
        };
        for order in orders {
            if order.delivery_status() != DeliveryStatus::Confirmed {
                continue;
            }
            match QueueTier::from_shipping_method(order.shipping_method()) {
                Some(QueueTier::Standard) => board.standard.push(order),
                Some(QueueTier::Economy) => board.economy.push(order),
                None => {}
            }
        }
        board
    }

    #[must_use]
    pub fn orders(&self, tier: QueueTier) -> &[&'a T] {
        match tier {
            QueueTier::Standard => &self.standard,
            QueueTier::Economy => &self.economy,
        }
    }

    #[must_use]
    pub fn count(&self, tier: QueueTier) -> usize {
        self.orders(tier).len()
    }

    #[must_use]
    pub fn readiness(&self, tier: QueueTier) -> u8 {
        readiness_percent(self.count(tier), tier)
    }

    #[must_use]
    pub fn is_ready(&self, tier: QueueTier) -> bool {
        self.readiness(tier) == 100
    }

    #[must_use]
    pub fn summary(&self, tier: QueueTier) -> QueueSummary {
        QueueSummary {
            tier,
            count: self.count(tier),
            min_batch: tier.min_batch(),
            readiness_percent: self.readiness(tier),
            ready: self.is_ready(tier),
        }
    }

    /// Summaries for both tiers, Standard first.
    #[must_use]
    pub fn summaries(&self) -> Vec<QueueSummary> {
        QueueTier::ALL.into_iter().map(|t| self.summary(t)).collect()
    }
}
