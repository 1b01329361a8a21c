use std::time::Duration;

use shield_dashboard_domain::config::{parse_var, ApiConfig, ConfigError};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub port: u16,
    /// Idle time after which a browser session is dropped
    pub session_ttl: Duration,
    /// Largest accepted request body, uploads included
    pub max_upload_bytes: usize,
    /// Reported by the health endpoint
    pub environment: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api = ApiConfig::from_lookup(&lookup)?;
        let port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        let session_ttl_secs = parse_var(&lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let max_upload_bytes = parse_var(&lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let environment = lookup("APP_ENV")
            .filter(|env| !env.trim().is_empty())
            .unwrap_or_else(|| "development".to_string());

        if max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MAX_UPLOAD_BYTES".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        // A session must outlive the slowest backend call it can be waiting on
        if session_ttl_secs <= api.timeout().as_secs() {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_SECS".to_string(),
                reason: format!(
                    "must be longer than the scoring timeout of {}s",
                    api.timeout().as_secs()
                ),
            });
        }

        Ok(Self {
            api,
            port,
            session_ttl: Duration::from_secs(session_ttl_secs),
            max_upload_bytes,
            environment,
        })
    }
}
