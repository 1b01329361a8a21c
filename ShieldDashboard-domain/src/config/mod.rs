//! Scoring backend configuration
//!
//! One base URL feeds both backend endpoints, and one timeout applies to
//! every call. The value is built once at startup and handed to the client;
//! nothing else reads the environment.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Base URL used when `SHIELD_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Upper bound on any single backend call
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Where the scoring backend lives and how long to wait for it
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    base_url: Url,
    score_url: Url,
    lab_upload_url: Url,
    timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            name: "SHIELD_API_URL".to_string(),
            reason,
        };

        // A trailing slash makes relative joins append instead of replace
        let normalized = format!("{}/", base_url.trim().trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base_url.scheme())));
        }
        if timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "SHIELD_API_TIMEOUT_SECS".to_string(),
                reason: "timeout must be greater than zero".to_string(),
            });
        }

        let score_url = base_url.join("sleep-score").map_err(|e| invalid(e.to_string()))?;
        let lab_upload_url = base_url.join("lab-upload").map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            base_url,
            score_url,
            lab_upload_url,
            timeout,
        })
    }

    /// Read `SHIELD_API_URL` and `SHIELD_API_TIMEOUT_SECS` through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("SHIELD_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let timeout_secs = parse_var(&lookup, "SHIELD_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        Self::new(&base_url, Duration::from_secs(timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn score_url(&self) -> &Url {
        &self.score_url
    }

    pub fn lab_upload_url(&self) -> &Url {
        &self.lab_upload_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Parse an optional variable, falling back to `default` when unset or blank
pub fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
            name: name.to_string(),
            reason: format!("'{}': {}", raw, e),
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.score_url().as_str(), "http://localhost:8000/api/sleep-score");
        assert_eq!(config.lab_upload_url().as_str(), "http://localhost:8000/api/lab-upload");
        assert_eq!(config.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(config.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_single_base_feeds_both_endpoints() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("SHIELD_API_URL", "https://scoring.example.org/v2/api/"),
            ("SHIELD_API_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.score_url().as_str(), "https://scoring.example.org/v2/api/sleep-score");
        assert_eq!(config.lab_upload_url().as_str(), "https://scoring.example.org/v2/api/lab-upload");
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ApiConfig::from_lookup(lookup_from(&[("SHIELD_API_URL", "not a url")])).is_err());
        assert!(ApiConfig::from_lookup(lookup_from(&[("SHIELD_API_URL", "ftp://host/api")])).is_err());

        let err = ApiConfig::from_lookup(lookup_from(&[("SHIELD_API_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(err.to_string().contains("SHIELD_API_TIMEOUT_SECS"));

        assert!(ApiConfig::from_lookup(lookup_from(&[("SHIELD_API_TIMEOUT_SECS", "0")])).is_err());
    }
}
