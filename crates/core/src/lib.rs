//! Vendor Hub Core - Shared domain types and rules.
//!
//! This crate provides the types and pure business rules used by every Vendor Hub
//! component:
//! - `dashboard` - Vendor-facing HTTP API over the managed backend
//! - `cli` - Operator tooling for migrations and lookups
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no I/O, no
//! database access, no HTTP clients. Everything here can be unit tested without
//! a runtime.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email, coordinates and entity status enums
//! - [`delivery`] - Delivery status enum and its transition table
//! - [`queue`] - Standard/Economy dispatch queues and readiness
//! - [`coupon`] - Coupon draft validation and discount arithmetic

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod coupon;
pub mod delivery;
pub mod queue;
pub mod types;

pub use coupon::{CouponDraft, CouponError, ValidCoupon};
pub use delivery::{DeliveryError, DeliveryStatus};
pub use queue::{QueueBoard, QueueSummary, QueueTier, Queued, readiness_percent};
pub use types::*;
