//! Client configuration and retry policy.
//!
//! Configuration comes either from the environment (`from_env`) or from a
//! TOML file (`from_path`). Both paths should be followed by `validate()`.

use crate::error::ConfigError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.nasa.gov/";
pub const DEFAULT_EXOPLANET_URL: &str =
    "https://exoplanetarchive.ipac.caltech.edu/cgi-bin/nstedAPI/nph-nstedAPI";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

// ============================================================================
// RETRY POLICY
// ============================================================================

/// How the session retries failed requests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Base of the exponential backoff, in seconds.
    pub backoff_factor: f64,
    pub retryable_status_codes: BTreeSet<u16>,
    /// Upper bound for a single sleep.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff_factor: 0.25,
            retryable_status_codes: [500, 502, 503, 504].into_iter().collect(),
            max_backoff_ms: 120_000,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    pub fn with_retryable_status_codes<I: IntoIterator<Item = u16>>(mut self, codes: I) -> Self {
        self.retryable_status_codes = codes.into_iter().collect();
        self
    }

    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff_ms = max_backoff.as_millis() as u64;
        self
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Sleep before the retry that follows failed attempt `attempt`
    /// (0 = the first failure): `backoff_factor * 2^attempt` seconds, capped.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let cap = self.max_backoff();
        if !self.backoff_factor.is_finite() || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(attempt.min(62) as i32);
        if !secs.is_finite() || secs >= cap.as_secs_f64() {
            return cap;
        }
        Duration::from_secs_f64(secs)
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retryable_status_codes.contains(&status)
    }
}

// ============================================================================
// CLIENT CONFIG
// ============================================================================

/// Connection settings: credentials, endpoints, timeout, cache TTL and retry.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub api_key: SecretString,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_exoplanet_url")]
    pub exoplanet_url: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into()))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_exoplanet_url() -> String {
    DEFAULT_EXOPLANET_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("exoplanet_url", &self.exoplanet_url)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("cache_ttl_secs", &self.cache_ttl_secs)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ClientConfig {
    /// Config with the given key and every other field at its default.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key: String = api_key.into();
        Self {
            api_key: SecretString::new(api_key.into()),
            base_url: default_base_url(),
            exoplanet_url: default_exoplanet_url(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_exoplanet_url(mut self, exoplanet_url: impl Into<String>) -> Self {
        self.exoplanet_url = exoplanet_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_secs = ttl.as_secs();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Create ClientConfig from environment variables.
    ///
    /// Environment variables:
    /// - `NASA_API_KEY`: API key (required)
    /// - `SKYFEED_BASE_URL`: API root (default: https://api.nasa.gov/)
    /// - `SKYFEED_EXOPLANET_URL`: exoplanet archive endpoint
    /// - `SKYFEED_REQUEST_TIMEOUT_MS`: per-request timeout (default: 30000)
    /// - `SKYFEED_CACHE_TTL_SECS`: default cache TTL (default: 3600)
    /// - `SKYFEED_MAX_ATTEMPTS`: total attempts per request (default: 5)
    /// - `SKYFEED_BACKOFF_FACTOR`: backoff base in seconds (default: 0.25)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("NASA_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired {
                field: "NASA_API_KEY".to_string(),
            })?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup("SKYFEED_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(exoplanet_url) = lookup("SKYFEED_EXOPLANET_URL") {
            config.exoplanet_url = exoplanet_url;
        }
        if let Some(raw) = lookup("SKYFEED_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = parse_env("SKYFEED_REQUEST_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("SKYFEED_CACHE_TTL_SECS") {
            config.cache_ttl_secs = parse_env("SKYFEED_CACHE_TTL_SECS", &raw)?;
        }
        if let Some(raw) = lookup("SKYFEED_MAX_ATTEMPTS") {
            config.retry.max_attempts = parse_env("SKYFEED_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(raw) = lookup("SKYFEED_BACKOFF_FACTOR") {
            config.retry.backoff_factor = parse_env("SKYFEED_BACKOFF_FACTOR", &raw)?;
        }

        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "api_key".to_string(),
            });
        }
        validate_url("base_url", &self.base_url)?;
        validate_url("exoplanet_url", &self.exoplanet_url)?;
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "0", "must be > 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "0", "must be >= 1"));
        }
        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 0.0 {
            return Err(invalid(
                "retry.backoff_factor",
                &self.retry.backoff_factor.to_string(),
                "must be finite and >= 0",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(field, raw, &e.to_string()))
}

fn validate_url(field: &str, url: &str) -> Result<(), ConfigError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, url, "must not be empty"));
    }
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(invalid(field, url, "must start with http:// or https://"));
    }
    Ok(())
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Backoff never exceeds the cap and never shrinks between attempts.
        #[test]
        fn prop_backoff_monotonic_and_capped(
            factor in 0.0f64..10.0,
            cap_ms in 1u64..600_000,
            attempt in 0u32..80,
        ) {
            let policy = RetryPolicy::default()
                .with_backoff_factor(factor)
                .with_max_backoff(Duration::from_millis(cap_ms));
            let current = policy.backoff_for(attempt);
            let next = policy.backoff_for(attempt + 1);
            prop_assert!(current <= policy.max_backoff());
            prop_assert!(next >= current);
        }
    }
}
