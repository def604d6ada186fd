//! Geocoding lookups from the terminal, using the dashboard's client and
//! `GEOCODING_*` settings.

use vendor_hub_dashboard::config::{ConfigError, GeocodingConfig};
use vendor_hub_dashboard::geocoding::{GeocodingClient, GeocodingError};

#[derive(Debug, thiserror::Error)]
pub enum GeocodeCommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geocoding(#[from] GeocodingError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

fn client() -> Result<GeocodingClient, GeocodeCommandError> {
    dotenvy::dotenv().ok();
    Ok(GeocodingClient::new(&GeocodingConfig::from_env()?)?)
}

/// Print the candidates for `query` as JSON.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the lookup fails.
pub async fn search(query: &str) -> Result<(), GeocodeCommandError> {
    let results = client()?.search(query).await?;
    if results.fallback {
        tracing::warn!("Geocoder unavailable, showing cached suggestions");
    }

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    Ok(())
}

/// Print the place at a point as JSON.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the lookup fails.
pub async fn reverse(lat: f64, lon: f64) -> Result<(), GeocodeCommandError> {
    let place = client()?.reverse(lat, lon).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&place)?);
    }
    Ok(())
}
