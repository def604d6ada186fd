//! Rate limiting for the routes that call paid or shared third-party APIs.
//!
//! - `lookup_rate_limiter`: geocoding lookups (~60/min per IP)
//! - `ai_rate_limiter`: AI helper calls (~10/min per IP)

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor reading the real client IP from proxy headers, in order:
/// `CF-Connecting-IP`, the first `X-Forwarded-For` hop, `X-Real-IP`,
/// `Fly-Client-IP`.
#[derive(Clone, Copy)]
pub struct CloudflareIpKeyExtractor;

const IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-forwarded-for",
    "x-real-ip",
    "fly-client-ip",
];

impl tower_governor::key_extractor::KeyExtractor for CloudflareIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let headers = req.headers();
        IP_HEADERS
            .iter()
            .find_map(|name| {
                headers
                    .get(*name)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.split(',').next())
                    .and_then(|s| s.trim().parse::<IpAddr>().ok())
            })
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<CloudflareIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn limiter(replenish_seconds: u64, burst: u32) -> Option<RateLimiterLayer> {
    let config = GovernorConfigBuilder::default()
        .key_extractor(CloudflareIpKeyExtractor)
        .per_second(replenish_seconds)
        .burst_size(burst)
        .finish()?;
    Some(GovernorLayer::new(Arc::new(config)))
}

/// One request per second replenished, burst of 20.
///
/// `None` only if the governor rejects the quota.
#[must_use]
pub fn lookup_rate_limiter() -> Option<RateLimiterLayer> {
    limiter(1, 20)
}

/// One request every 6 seconds replenished, burst of 5.
#[must_use]
pub fn ai_rate_limiter() -> Option<RateLimiterLayer> {
    limiter(6, 5)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_header_precedence() {
        let req = request(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("cf-connecting-ip", "198.51.100.2"),
        ]);
        let ip = CloudflareIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());

        let req = request(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1")]);
        let ip = CloudflareIpKeyExtractor.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_missing_ip_is_rejected() {
        let req = request(&[("x-real-ip", "not-an-ip")]);
        assert!(CloudflareIpKeyExtractor.extract(&req).is_err());
    }

    #[test]
    fn test_limiters_build() {
        assert!(lookup_rate_limiter().is_some());
        assert!(ai_rate_limiter().is_some());
    }
}
