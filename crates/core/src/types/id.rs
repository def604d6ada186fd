//! Newtype IDs for type-safe entity references.
//!
//! The backend keys every table by UUID. Use the `define_id!` macro to create
//! wrappers that prevent accidentally passing a store ID where an order ID is
//! expected.

/// Macro to define a type-safe UUID wrapper.
///
/// Creates a newtype wrapper around [`uuid::Uuid`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `random()`, `as_uuid()`
/// - `Display`, `FromStr`, `From<Uuid>` and `Into<Uuid>` implementations
///
/// # Example
///
/// ```rust
/// # use vendor_hub_core::define_id;
/// define_id!(WarehouseId);
/// define_id!(ShelfId);
///
/// let warehouse = WarehouseId::random();
/// let parsed: WarehouseId = warehouse.to_string().parse().unwrap();
/// assert_eq!(parsed, warehouse);
///
/// // These are different types, so this won't compile:
/// // let _: ShelfId = warehouse;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh random (v4) ID.
            #[must_use]
            pub fn random() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                ::uuid::Uuid::parse_str(s).map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// The backend's auth user id doubles as the vendor id.
define_id!(VendorId);
define_id!(CustomerId);
define_id!(StoreId);
define_id!(ProductId);
define_id!(OrderId);
define_id!(CouponId);
define_id!(ReviewId);
define_id!(NotificationId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_matches_uuid() {
        let uuid = uuid::Uuid::new_v4();
        assert_eq!(OrderId::new(uuid).to_string(), uuid.to_string());
    }

    #[test]
    fn test_id_parse() {
        let id: StoreId = "6f1c1f1e-8a4b-4c1e-9d7a-0b6f3c2a1e55".parse().unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "6f1c1f1e-8a4b-4c1e-9d7a-0b6f3c2a1e55"
        );
        assert!("not-a-uuid".parse::<StoreId>().is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ProductId::random();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
