//! HTTP middleware for the dashboard.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID (propagated or generated, echoed in the response)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//! 5. Rate limiting on the geocoding and AI routes
//!
//! Authentication is enforced per handler with the [`auth::RequireVendorAuth`]
//! extractor.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{OptionalVendorAuth, RequireVendorAuth, clear_current_vendor, set_current_vendor};
pub use rate_limit::{CloudflareIpKeyExtractor, RateLimiterLayer, ai_rate_limiter, lookup_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use session::{SESSION_COOKIE_NAME, SessionLayerError, create_session_layer, session_layer};
