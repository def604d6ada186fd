//! Vendor dashboard preferences.
//!
//! Small JSON values keyed per vendor: table column choices, the last
//! selected store, map zoom. Business data never lives here.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use vendor_hub_core::VendorId;

use super::RepositoryError;

/// Longest accepted preference key.
pub const MAX_KEY_LENGTH: usize = 100;

/// Whether `key` is a usable preference key: dotted segments of letters,
/// digits, `-` and `_`.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_KEY_LENGTH
        && key
            .split('.')
            .all(|segment| {
                !segment.is_empty()
                    && segment
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            })
}

/// Repository for `dashboard.vendor_preference`.
pub struct PreferenceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PreferenceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        vendor: VendorId,
        key: &str,
    ) -> Result<Option<JsonValue>, RepositoryError> {
        let value = sqlx::query_scalar::<_, JsonValue>(
            r"
            SELECT value FROM dashboard.vendor_preference
            WHERE vendor_id = $1 AND key = $2
            ",
        )
        .bind(vendor.as_uuid())
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(value)
    }

    /// Insert or replace a preference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set(
        &self,
        vendor: VendorId,
        key: &str,
        value: &JsonValue,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO dashboard.vendor_preference (vendor_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (vendor_id, key) DO UPDATE SET value = $3, updated_at = NOW()
            ",
        )
        .bind(vendor.as_uuid())
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if there was nothing to delete.
    pub async fn delete(&self, vendor: VendorId, key: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM dashboard.vendor_preference
            WHERE vendor_id = $1 AND key = $2
            ",
        )
        .bind(vendor.as_uuid())
        .bind(key)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_key() {
        assert!(is_valid_key("orders.table.columns"));
        assert!(is_valid_key("last_store"));
        assert!(is_valid_key("map-zoom"));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("orders..columns"));
        assert!(!is_valid_key("orders/columns"));
        assert!(!is_valid_key(&"a".repeat(MAX_KEY_LENGTH + 1)));
    }
}
