//! Aggregates returned by the backend reporting RPCs.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use vendor_hub_core::ProductId;

/// Result of `get_revenue_summary`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSummary {
    pub total_revenue: Decimal,
    #[serde(default)]
    pub total_cost: Decimal,
    pub total_orders: i64,
    #[serde(default)]
    pub average_order_value: Decimal,
}

impl RevenueSummary {
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.total_revenue - self.total_cost
    }

    /// Profit as a percentage of revenue, two decimal places. Zero when there
    /// is no revenue.
    #[must_use]
    pub fn profit_margin_percent(&self) -> Decimal {
        if self.total_revenue.is_zero() {
            return Decimal::ZERO;
        }
        (self.profit() * Decimal::ONE_HUNDRED / self.total_revenue)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// One row of `get_monthly_revenue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    pub month: String,
    pub revenue: Decimal,
    pub orders: i64,
}

/// One row of `get_top_products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub product_id: ProductId,
    pub product_name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}
