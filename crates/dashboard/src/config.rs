//! Dashboard configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DASHBOARD_DATABASE_URL` - `PostgreSQL` connection string for sessions and
//!   preferences (falls back to `DATABASE_URL`)
//! - `DASHBOARD_BASE_URL` - Public URL for the dashboard API
//! - `DASHBOARD_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `BACKEND_URL` - Base URL of the managed backend (auth, tables, RPC, storage)
//! - `BACKEND_ANON_KEY` - Public API key sent with every backend request
//! - `CLAUDE_API_KEY` - Anthropic Claude API key
//!
//! ## Optional
//! - `DASHBOARD_HOST` - Bind address (default: 127.0.0.1)
//! - `DASHBOARD_PORT` - Listen port (default: 3000)
//! - `CLAUDE_MODEL` - Claude model ID (default: claude-sonnet-4-20250514)
//! - `GEOCODING_BASE_URL` - Geocoding API (default: Nominatim)
//! - `GEOCODING_COUNTRY_CODES` - Comma-separated ISO country codes (default: vn)
//! - `GEOCODING_USER_AGENT` - User-Agent sent to the geocoder
//! - `STORE_ASSETS_BUCKET` - Storage bucket for store logos/banners (default: store-assets)
//! - `PRODUCT_IMAGES_BUCKET` - Storage bucket for product images (default: product-images)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_GEOCODING_USER_AGENT: &str = "vendor-hub-dashboard/0.1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Dashboard application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` URL for the dashboard's own tables (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the dashboard API
    pub base_url: String,
    /// Session secret. Validated at startup and reserved for signed cookies;
    /// session cookies currently carry only an opaque store id.
    pub session_secret: SecretString,
    /// Managed backend configuration
    pub backend: BackendConfig,
    /// Claude AI configuration
    pub claude: ClaudeConfig,
    /// Geocoding configuration
    pub geocoding: GeocodingConfig,
    /// Object storage buckets
    pub storage: StorageConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Managed backend configuration.
///
/// The anon key is meant to be public, but it still identifies
/// the project, so `Debug` redacts it.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://abc.backend.example`
    pub url: Url,
    /// Anonymous API key sent as `apikey`
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Claude AI API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model ID (e.g., claude-sonnet-4-20250514)
    pub model: String,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Geocoding HTTP API configuration.
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    /// Base URL of a Nominatim-compatible API
    pub base_url: Url,
    /// ISO 3166-1 alpha-2 codes results are restricted to
    pub country_codes: Vec<String>,
    /// User-Agent header (Nominatim's usage policy requires one)
    pub user_agent: String,
}

/// Object storage bucket names.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub store_assets_bucket: String,
    pub product_images_bucket: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("DASHBOARD_DATABASE_URL")?;
        let host = get_env_or_default("DASHBOARD_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("DASHBOARD_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("DASHBOARD_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("DASHBOARD_BASE_URL")?;
        let session_secret = get_validated_secret("DASHBOARD_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "DASHBOARD_SESSION_SECRET")?;

        let backend = BackendConfig::from_env()?;
        let claude = ClaudeConfig::from_env()?;
        let geocoding = GeocodingConfig::from_env()?;
        let storage = StorageConfig::from_env();
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            backend,
            claude,
            geocoding,
            storage,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl BackendConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("BACKEND_URL")?;
        let url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;
        Ok(Self {
            url,
            anon_key: get_validated_secret("BACKEND_ANON_KEY")?,
        })
    }
}

impl ClaudeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_validated_secret("CLAUDE_API_KEY")?,
            model: get_env_or_default("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
        })
    }
}

impl GeocodingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = get_env_or_default("GEOCODING_BASE_URL", DEFAULT_GEOCODING_URL);
        let base_url = Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidEnvVar("GEOCODING_BASE_URL".to_string(), e.to_string())
        })?;
        let country_codes = parse_country_codes(&get_env_or_default("GEOCODING_COUNTRY_CODES", "vn"))
            .map_err(|e| ConfigError::InvalidEnvVar("GEOCODING_COUNTRY_CODES".to_string(), e))?;

        Ok(Self {
            base_url,
            country_codes,
            user_agent: get_env_or_default("GEOCODING_USER_AGENT", DEFAULT_GEOCODING_USER_AGENT),
        })
    }
}

impl StorageConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            store_assets_bucket: get_env_or_default("STORE_ASSETS_BUCKET", "store-assets"),
            product_images_bucket: get_env_or_default("PRODUCT_IMAGES_BUCKET", "product-images"),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a comma-separated list of two-letter country codes.
fn parse_country_codes(raw: &str) -> Result<Vec<String>, String> {
    let codes: Vec<String> = raw
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    if codes.is_empty() {
        return Err("at least one country code is required".to_string());
    }
    if let Some(bad) = codes
        .iter()
        .find(|c| c.len() != 2 || !c.chars().all(|ch| ch.is_ascii_alphabetic()))
    {
        return Err(format!("'{bad}' is not a two-letter country code"));
    }
    Ok(codes)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            database_url: SecretString::from("postgres://localhost/vendor_hub"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            backend: BackendConfig {
                url: Url::parse("https://project.backend.test").unwrap(),
                anon_key: SecretString::from("anon-key-value-that-is-secret"),
            },
            claude: ClaudeConfig {
                api_key: SecretString::from("sk-ant-test"),
                model: DEFAULT_CLAUDE_MODEL.to_string(),
            },
            geocoding: GeocodingConfig {
                base_url: Url::parse(DEFAULT_GEOCODING_URL).unwrap(),
                country_codes: vec!["vn".to_string()],
                user_agent: DEFAULT_GEOCODING_USER_AGENT.to_string(),
            },
            storage: StorageConfig {
                store_assets_bucket: "store-assets".to_string(),
                product_images_bucket: "product-images".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("zzzzzz") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("q8#Lm2!vR9@xT4$k") > 3.3);
    }

    #[test]
    fn test_validate_secret_strength() {
        assert!(matches!(
            validate_secret_strength("your-anon-key", "TEST_VAR"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
        assert!(validate_secret_strength("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb", "TEST_VAR").is_err());
        assert!(validate_secret_strength("q8#Lm2!vR9@xT4$kZ7%nB1^cW6&", "TEST_VAR").is_ok());
    }

    #[test]
    fn test_validate_session_secret_length() {
        assert!(validate_session_secret(&SecretString::from("short"), "S").is_err());
        assert!(validate_session_secret(&SecretString::from("a".repeat(32)), "S").is_ok());
    }

    #[test]
    fn test_parse_country_codes() {
        assert_eq!(
            parse_country_codes("VN, th").unwrap(),
            vec!["vn".to_string(), "th".to_string()]
        );
        assert!(parse_country_codes("").is_err());
        assert!(parse_country_codes("vnm").is_err());
        assert!(parse_country_codes("v1").is_err());
    }

    #[test]
    fn test_socket_addr_and_secure_flag() {
        let config = sample_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = sample_config();
        let backend = format!("{:?}", config.backend);
        assert!(backend.contains("project.backend.test"));
        assert!(!backend.contains("anon-key-value-that-is-secret"));

        let claude = format!("{:?}", config.claude);
        assert!(claude.contains(DEFAULT_CLAUDE_MODEL));
        assert!(claude.contains("[REDACTED]"));
        assert!(!claude.contains("sk-ant-test"));
    }
}
