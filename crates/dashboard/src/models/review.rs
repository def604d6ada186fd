//! Customer reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendor_hub_core::{CustomerId, ProductId, ReviewId, StoreId};

/// A customer review of a store or one of its products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub store_id: StoreId,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    /// 1 to 5 stars.
    pub rating: i16,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub replied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
