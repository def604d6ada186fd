//! Revenue and product reports.
//!
//! The aggregation runs on the backend; this layer checks the window and limit
//! and adds the derived profit figures.

use rust_decimal::Decimal;
use serde::Serialize;

use vendor_hub_core::StoreId;

use super::{ServiceError, ValidationError};
use crate::backend::{AccessToken, Backend};
use crate::models::{MonthlyRevenue, RevenueSummary, TopProduct};

pub const MAX_REPORT_DAYS: u32 = 365;
pub const MAX_TOP_PRODUCTS: u32 = 50;
pub const DEFAULT_TOP_PRODUCTS: u32 = 10;

/// Revenue summary with profit figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    #[serde(flatten)]
    pub revenue: RevenueSummary,
    pub profit: Decimal,
    pub profit_margin_percent: Decimal,
    /// Window in days, `None` for all time.
    pub days: Option<u32>,
}

impl ReportSummary {
    fn new(revenue: RevenueSummary, days: Option<u32>) -> Self {
        Self {
            profit: revenue.profit(),
            profit_margin_percent: revenue.profit_margin_percent(),
            revenue,
            days,
        }
    }
}

pub struct ReportService<'a> {
    backend: &'a dyn Backend,
    token: &'a AccessToken,
}

impl<'a> ReportService<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn Backend, token: &'a AccessToken) -> Self {
        Self { backend, token }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a window outside 1..=365 days,
    /// otherwise `ServiceError::Backend` if the RPC fails.
    pub async fn summary(
        &self,
        store: StoreId,
        days: Option<u32>,
    ) -> Result<ReportSummary, ServiceError> {
        check_days(days)?;
        let revenue = self.backend.revenue_summary(self.token, store, days).await?;
        Ok(ReportSummary::new(revenue, days))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Backend` if the RPC fails.
    pub async fn monthly(&self, store: StoreId) -> Result<Vec<MonthlyRevenue>, ServiceError> {
        Ok(self.backend.monthly_revenue(self.token, store).await?)
    }

    /// Best sellers, `limit` defaulting to 10.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a bad window or a limit outside
    /// 1..=50, otherwise `ServiceError::Backend` if the RPC fails.
    pub async fn top_products(
        &self,
        store: StoreId,
        days: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<TopProduct>, ServiceError> {
        check_days(days)?;
        let limit = limit.unwrap_or(DEFAULT_TOP_PRODUCTS);
        if !(1..=MAX_TOP_PRODUCTS).contains(&limit) {
            return Err(ValidationError::new(
                "limit",
                format!("must be between 1 and {MAX_TOP_PRODUCTS}"),
            )
            .into());
        }
        Ok(self
            .backend
            .top_products(self.token, store, days, limit)
            .await?)
    }
}

fn check_days(days: Option<u32>) -> Result<(), ValidationError> {
    match days {
        Some(d) if !(1..=MAX_REPORT_DAYS).contains(&d) => Err(ValidationError::new(
            "days",
            format!("must be between 1 and {MAX_REPORT_DAYS}"),
        )),
        _ => Ok(()),
    }
}
