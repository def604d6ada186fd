//! Domain models exchanged with the backend.
//!
//! Row types (`Store`, `Order`, ...) mirror the backend tables and are what
//! the API returns. `New*` types are insert payloads and `*Update` types are
//! partial updates where `None` fields are left untouched.

pub mod coupon;
pub mod notification;
pub mod order;
pub mod product;
pub mod report;
pub mod review;
pub mod session;
pub mod store;

pub use coupon::{Coupon, CouponUpdate, NewCoupon};
pub use notification::{NewNotification, Notification};
pub use order::{DeliveryDetailsUpdate, Order, OrderItem};
pub use product::{NewProduct, Product, ProductUpdate};
pub use report::{MonthlyRevenue, RevenueSummary, TopProduct};
pub use review::Review;
pub use session::{AuthSession, AuthUser, CurrentVendor, keys as session_keys};
pub use store::{NewStore, SocialLinks, Store, StoreUpdate};
