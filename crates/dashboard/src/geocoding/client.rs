//! Nominatim HTTP client with a short-lived result cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Deserialize;
use tracing::instrument;

use vendor_hub_core::Coordinates;

use super::{GeocodeCandidate, GeocodeResults, GeocodingError};
use crate::config::GeocodingConfig;

/// Queries shorter than this are not sent.
pub const MIN_QUERY_LEN: usize = 3;
const MAX_RESULTS: &str = "5";
const CACHE_TTL: Duration = Duration::from_secs(600);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geocoding API client.
///
/// Search results are cached for 10 minutes, keyed by the normalized query.
/// The cache doubles as the fallback source when the API is unreachable.
#[derive(Clone)]
pub struct GeocodingClient {
    inner: Arc<GeocodingClientInner>,
}

struct GeocodingClientInner {
    client: reqwest::Client,
    base_url: String,
    country_codes: String,
    cache: Cache<String, Vec<GeocodeCandidate>>,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
}

impl Place {
    fn into_candidate(self) -> Result<GeocodeCandidate, GeocodingError> {
        let parse = |v: &str| {
            v.parse::<f64>()
                .map_err(|e| GeocodingError::Parse(format!("bad coordinate {v:?}: {e}")))
        };
        Ok(GeocodeCandidate {
            latitude: parse(&self.lat)?,
            longitude: parse(&self.lon)?,
            display_name: self.display_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReversePlace {
    #[serde(default)]
    lat: Option<String>,
    #[serde(default)]
    lon: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl GeocodingClient {
    /// Create a new geocoding client.
    ///
    /// # Errors
    ///
    /// Returns `GeocodingError::Http` if the HTTP client cannot be built.
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(GeocodingClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                country_codes: config.country_codes.join(","),
                cache,
            }),
        })
    }

    /// Search for places matching a free-text address.
    ///
    /// Short queries return no candidates without a request. When the request
    /// fails, the cached result of the longest earlier query that prefixes this
    /// one is returned with `fallback` set.
    ///
    /// # Errors
    ///
    /// Returns the request error if it fails and nothing usable is cached.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<GeocodeResults, GeocodingError> {
        let key = normalize_query(query);
        if key.chars().count() < MIN_QUERY_LEN {
            return Ok(GeocodeResults::empty(query));
        }

        if let Some(candidates) = self.inner.cache.get(&key).await {
            tracing::debug!("Geocoding cache hit");
            return Ok(GeocodeResults {
                query: query.to_string(),
                candidates,
                fallback: false,
            });
        }

        match self.fetch_search(query.trim()).await {
            Ok(candidates) => {
                self.inner.cache.insert(key, candidates.clone()).await;
                Ok(GeocodeResults {
                    query: query.to_string(),
                    candidates,
                    fallback: false,
                })
            }
            Err(e) => {
                let Some(candidates) = self.best_cached_prefix(&key) else {
                    tracing::warn!(error = %e, "Geocoding failed with no fallback");
                    return Err(e);
                };
                tracing::warn!(error = %e, "Geocoding failed, using cached suggestion");
                Ok(GeocodeResults {
                    query: query.to_string(),
                    candidates,
                    fallback: true,
                })
            }
        }
    }

    /// Name the place at a point.
    ///
    /// # Errors
    ///
    /// - `GeocodingError::InvalidCoordinates` for out-of-range input
    /// - `GeocodingError::NoAddress` if nothing is there
    /// - `GeocodingError::Http`/`Status`/`Parse` if the request fails
    #[instrument(skip(self))]
    pub async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<GeocodeCandidate, GeocodingError> {
        let point = Coordinates::new(latitude, longitude)?;
        let lat = point.latitude.to_string();
        let lon = point.longitude.to_string();

        let response = self
            .inner
            .client
            .get(format!("{}/reverse", self.inner.base_url))
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }
        let place: ReversePlace = response
            .json()
            .await
            .map_err(|e| GeocodingError::Parse(e.to_string()))?;

        match place {
            ReversePlace {
                lat: Some(lat),
                lon: Some(lon),
                display_name: Some(display_name),
            } => Place {
                lat,
                lon,
                display_name,
            }
            .into_candidate(),
            _ => Err(GeocodingError::NoAddress {
                latitude,
                longitude,
            }),
        }
    }

    async fn fetch_search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, GeocodingError> {
        let mut params = vec![("q", query), ("format", "json"), ("limit", MAX_RESULTS)];
        if !self.inner.country_codes.is_empty() {
            params.push(("countrycodes", self.inner.country_codes.as_str()));
        }

        let response = self
            .inner
            .client
            .get(format!("{}/search", self.inner.base_url))
            .query(&params)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::Status(status.as_u16()));
        }

        let places: Vec<Place> = response
            .json()
            .await
            .map_err(|e| GeocodingError::Parse(e.to_string()))?;
        places.into_iter().map(Place::into_candidate).collect()
    }

    fn best_cached_prefix(&self, key: &str) -> Option<Vec<GeocodeCandidate>> {
        self.inner
            .cache
            .iter()
            .filter(|(cached, _)| key.starts_with(cached.as_str()))
            .max_by_key(|(cached, _)| cached.len())
            .map(|(_, candidates)| candidates)
    }
}

/// Lower-case and collapse runs of whitespace.
fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
