//! Address search against a Nominatim-compatible geocoding API.
//!
//! Used by the store setup and delivery-detail forms to turn a typed address
//! into pickup or drop-off coordinates, and by the map to label a clicked point.

mod client;

pub use client::GeocodingClient;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the geocoding API.
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("geocoding API returned status {0}")]
    Status(u16),

    /// The response body could not be understood.
    #[error("parse error: {0}")]
    Parse(String),

    /// Reverse lookup found nothing at the point.
    #[error("no address found at {latitude}, {longitude}")]
    NoAddress { latitude: f64, longitude: f64 },

    /// Coordinates passed to a reverse lookup were out of range.
    #[error(transparent)]
    InvalidCoordinates(#[from] vendor_hub_core::CoordinateError),
}

/// One search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeCandidate {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

/// Result of a forward search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResults {
    /// The query as typed.
    pub query: String,
    pub candidates: Vec<GeocodeCandidate>,
    /// The live lookup failed and `candidates` come from an earlier, shorter
    /// query that is a prefix of this one.
    pub fallback: bool,
}

impl GeocodeResults {
    #[must_use]
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            candidates: Vec::new(),
            fallback: false,
        }
    }
}
