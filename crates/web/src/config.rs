//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `SHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOP_PORT` - Listen port (default: 3000)
//! - `SHOP_BASE_URL` - Public URL (default: `http://localhost:3000`)
//! - `SHOP_UTC_OFFSET` - Offset weeks are counted in, e.g. `+01:00` (default: server local time)
//! - `SHOP_STORE_TIMEOUT_SECS` - Upper bound for each database call (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0 to 1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0 to 1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::FixedOffset;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;
use weekly_shop_core::WeekZone;

const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Weekly Shop application configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL
    pub base_url: Url,
    /// Zone in which calendar weeks are counted
    pub week_zone: WeekZone,
    /// Upper bound for each database call
    pub store_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions sent to Sentry
    pub sentry_traces_sample_rate: f32,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("SHOP_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("SHOP_DATABASE_URL".to_string()))?;

        let host = parse_var(&lookup, "SHOP_HOST", "127.0.0.1")?;
        let port = parse_var(&lookup, "SHOP_PORT", "3000")?;
        let base_url = parse_var(&lookup, "SHOP_BASE_URL", "http://localhost:3000")?;

        let week_zone = match lookup("SHOP_UTC_OFFSET") {
            Some(raw) => WeekZone::Fixed(parse_utc_offset(&raw).ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "SHOP_UTC_OFFSET".to_string(),
                    format!("expected an offset like +01:00, got '{raw}'"),
                )
            })?),
            None => WeekZone::Local,
        };

        let timeout_secs: u64 = parse_var(
            &lookup,
            "SHOP_STORE_TIMEOUT_SECS",
            &DEFAULT_STORE_TIMEOUT_SECS.to_string(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SHOP_STORE_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            week_zone,
            store_timeout: Duration::from_secs(timeout_secs),
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_rate(&lookup, "SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_rate(&lookup, "SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when unset.
fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .unwrap_or_else(|| default.to_string())
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a sample rate and check it lies in `0.0..=1.0`.
fn parse_rate(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<f32, ConfigError> {
    let rate: f32 = parse_var(lookup, key, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("{rate} is outside 0.0..=1.0"),
        ))
    }
}

/// Parse `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `+HHMM`.
fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits.get(..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..)?.parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            ShopConfig::from_lookup(lookup_from(&[("SHOP_DATABASE_URL", "postgres://db/shop")]))
                .unwrap();

        assert_eq!(config.database_url.expose_secret(), "postgres://db/shop");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.week_zone, WeekZone::Local);
        assert_eq!(config.store_timeout, Duration::from_secs(10));
        assert!(config.sentry_dsn.is_none());
        assert!(!config.is_secure());
    }

    #[test]
    fn test_database_url_falls_back_to_generic_var() {
        let config =
            ShopConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://fly/db")])).unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/db");
    }

    #[test]
    fn test_missing_database_url() {
        let err = ShopConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "SHOP_DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = ShopConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SHOP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SHOP_PORT"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = ShopConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SHOP_STORE_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_https_base_url_is_secure() {
        let config = ShopConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SHOP_BASE_URL", "https://shop.example.org"),
        ]))
        .unwrap();
        assert!(config.is_secure());
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let err = ShopConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SENTRY_SAMPLE_RATE", "1.5"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "SENTRY_SAMPLE_RATE"));
    }

    #[test]
    fn test_parse_utc_offset() {
        assert_eq!(parse_utc_offset("+01:00"), FixedOffset::east_opt(3600));
        assert_eq!(parse_utc_offset("-0530"), FixedOffset::west_opt(5 * 3600 + 1800));
        assert_eq!(parse_utc_offset("Z"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("utc"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("01:00"), None);
        assert_eq!(parse_utc_offset("+1:00"), None);
        assert_eq!(parse_utc_offset("+15:00"), None);
        assert_eq!(parse_utc_offset(""), None);
    }

    #[test]
    fn test_configured_offset() {
        let config = ShopConfig::from_lookup(lookup_from(&[
            ("SHOP_DATABASE_URL", "postgres://db/shop"),
            ("SHOP_UTC_OFFSET", "+02:00"),
        ]))
        .unwrap();
        assert_eq!(
            config.week_zone,
            WeekZone::Fixed(FixedOffset::east_opt(7200).unwrap())
        );
    }
}
