//! Coupon drafts and discount arithmetic.
//!
//! A [`CouponDraft`] is what a vendor typed into the coupon form: the value is
//! still a string so that a blank field can be told apart from zero. Drafts
//! must pass [`CouponDraft::validate`] before anything is sent to the backend.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DiscountKind;

/// Maximum coupon code length.
pub const MAX_CODE_LENGTH: usize = 32;

/// Reasons a coupon draft is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    #[error("coupon code is required")]
    MissingCode,
    #[error("coupon code must be at most {MAX_CODE_LENGTH} letters, digits, '-' or '_'")]
    InvalidCode,
    #[error("discount value is required")]
    MissingValue,
    #[error("discount value is not a number: {0}")]
    InvalidValue(String),
    #[error("percentage discount must be greater than 0 and at most 100")]
    PercentageOutOfRange,
    #[error("fixed discount must be greater than 0")]
    NonPositiveAmount,
    #[error("minimum spend cannot be negative")]
    NegativeMinimumSpend,
    #[error("usage limit must be at least 1")]
    InvalidUsageLimit,
    #[error("coupon must end after it starts")]
    InvalidWindow,
}

/// Coupon form input, unvalidated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouponDraft {
    #[serde(default)]
    pub code: String,
    pub discount_kind: Option<DiscountKind>,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub min_spend: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

/// A coupon that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidCoupon {
    pub code: String,
    pub discount_kind: DiscountKind,
    pub value: Decimal,
    pub min_spend: Decimal,
    pub usage_limit: Option<i32>,
    pub is_active: bool,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl CouponDraft {
    /// Validate and normalize the draft.
    ///
    /// The code is trimmed and upper-cased. A missing discount kind defaults
    /// to a percentage.
    ///
    /// # Errors
    ///
    /// Returns the first [`CouponError`] found, checking the code, then the
    /// value, then spend/limit/window.
    pub fn validate(&self) -> Result<ValidCoupon, CouponError> {
        let code = self.code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(CouponError::MissingCode);
        }
        if code.len() > MAX_CODE_LENGTH
            || !code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CouponError::InvalidCode);
        }

        let raw_value = self.value.trim();
        if raw_value.is_empty() {
            return Err(CouponError::MissingValue);
        }
        let value = Decimal::from_str(raw_value)
            .map_err(|_| CouponError::InvalidValue(raw_value.to_string()))?;

        let discount_kind = self.discount_kind.unwrap_or(DiscountKind::Percentage);
        match discount_kind {
            DiscountKind::Percentage => {
                if value <= Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                    return Err(CouponError::PercentageOutOfRange);
                }
            }
            DiscountKind::FixedAmount => {
                if value <= Decimal::ZERO {
                    return Err(CouponError::NonPositiveAmount);
                }
            }
        }

        let min_spend = self.min_spend.unwrap_or(Decimal::ZERO);
        if min_spend < Decimal::ZERO {
            return Err(CouponError::NegativeMinimumSpend);
        }

        if matches!(self.usage_limit, Some(limit) if limit < 1) {
            return Err(CouponError::InvalidUsageLimit);
        }

        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
            if end <= start {
                return Err(CouponError::InvalidWindow);
            }
        }

        Ok(ValidCoupon {
            code,
            discount_kind,
            value,
            min_spend,
            usage_limit: self.usage_limit,
            is_active: self.is_active,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
        })
    }
}

impl ValidCoupon {
    /// Discount granted on `subtotal`.
    ///
    /// Zero below the minimum spend; never more than the subtotal.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal <= Decimal::ZERO || subtotal < self.min_spend {
            return Decimal::ZERO;
        }
        let discount = match self.discount_kind {
            DiscountKind::Percentage => subtotal * self.value / Decimal::ONE_HUNDRED,
            DiscountKind::FixedAmount => self.value,
        };
        discount.min(subtotal)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn draft(code: &str, kind: DiscountKind, value: &str) -> CouponDraft {
        CouponDraft {
            code: code.to_string(),
            discount_kind: Some(kind),
            value: value.to_string(),
            is_active: true,
            ..CouponDraft::default()
        }
    }

    #[test]
    fn test_blank_code_rejected() {
        let d = draft("   ", DiscountKind::Percentage, "10");
        assert_eq!(d.validate(), Err(CouponError::MissingCode));
    }

    #[test]
    fn test_blank_value_rejected() {
        let d = draft("SUMMER", DiscountKind::Percentage, " ");
        assert_eq!(d.validate(), Err(CouponError::MissingValue));
    }

    #[test]
    fn test_code_normalized() {
        let coupon = draft(" summer-24 ", DiscountKind::Percentage, "15")
            .validate()
            .unwrap();
        assert_eq!(coupon.code, "SUMMER-24");
        assert_eq!(coupon.value, Decimal::from(15));
        assert_eq!(coupon.min_spend, Decimal::ZERO);
    }

    #[test]
    fn test_code_charset() {
        let d = draft("SAVE 10", DiscountKind::Percentage, "10");
        assert_eq!(d.validate(), Err(CouponError::InvalidCode));
    }

    #[test]
    fn test_value_ranges() {
        assert_eq!(
            draft("A", DiscountKind::Percentage, "0").validate(),
            Err(CouponError::PercentageOutOfRange)
        );
        assert_eq!(
            draft("A", DiscountKind::Percentage, "100.5").validate(),
            Err(CouponError::PercentageOutOfRange)
        );
        assert!(draft("A", DiscountKind::Percentage, "100").validate().is_ok());
        assert_eq!(
            draft("A", DiscountKind::FixedAmount, "-5").validate(),
            Err(CouponError::NonPositiveAmount)
        );
        assert!(matches!(
            draft("A", DiscountKind::FixedAmount, "ten").validate(),
            Err(CouponError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_window_and_limits() {
        let now = Utc::now();
        let mut d = draft("A", DiscountKind::FixedAmount, "5");
        d.starts_at = Some(now);
        d.ends_at = Some(now - Duration::days(1));
        assert_eq!(d.validate(), Err(CouponError::InvalidWindow));

        let mut d = draft("A", DiscountKind::FixedAmount, "5");
        d.usage_limit = Some(0);
        assert_eq!(d.validate(), Err(CouponError::InvalidUsageLimit));

        let mut d = draft("A", DiscountKind::FixedAmount, "5");
        d.min_spend = Some(Decimal::from(-1));
        assert_eq!(d.validate(), Err(CouponError::NegativeMinimumSpend));
    }

    #[test]
    fn test_discount_for() {
        let mut d = draft("A", DiscountKind::Percentage, "20");
        d.min_spend = Some(Decimal::from(50));
        let pct = d.validate().unwrap();
        assert_eq!(pct.discount_for(Decimal::from(40)), Decimal::ZERO);
        assert_eq!(pct.discount_for(Decimal::from(100)), Decimal::from(20));

        let fixed = draft("B", DiscountKind::FixedAmount, "30").validate().unwrap();
        assert_eq!(fixed.discount_for(Decimal::from(20)), Decimal::from(20));
        assert_eq!(fixed.discount_for(Decimal::from(90)), Decimal::from(30));
    }
}
