//! Configuration Module
//!
//! Runtime settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Production backend used when `AUTOGEST_API_URL` is unset
pub const DEFAULT_API_URL: &str = "https://autogest-backend-ikmb.onrender.com";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    /// Build configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup("AUTOGEST_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::InvalidApiUrl(api_url));
        }

        let request_timeout = match lookup("AUTOGEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
                if secs == 0 {
                    return Err(ConfigError::InvalidTimeout(raw));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let data_dir = lookup("AUTOGEST_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            request_timeout,
            data_dir,
        })
    }

    /// Directory holding rolling log files
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("AutoGest")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("AUTOGEST_API_URL must be an http(s) URL, got: {0}")]
    InvalidApiUrl(String),

    #[error("AUTOGEST_TIMEOUT_SECS must be a positive integer, got: {0}")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.data_dir.ends_with("AutoGest"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config =
            Config::from_lookup(lookup_from(&[("AUTOGEST_API_URL", "http://localhost:8000/")]))
                .unwrap();
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn rejects_non_http_url() {
        let err = Config::from_lookup(lookup_from(&[("AUTOGEST_API_URL", "ftp://host")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidApiUrl(_)));
    }

    #[test]
    fn rejects_zero_or_garbage_timeout() {
        for raw in ["0", "soon"] {
            let err = Config::from_lookup(lookup_from(&[("AUTOGEST_TIMEOUT_SECS", raw)]))
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTimeout(_)));
        }
    }

    #[test]
    fn log_dir_lives_under_data_dir() {
        let config =
            Config::from_lookup(lookup_from(&[("AUTOGEST_DATA_DIR", "/tmp/autogest")])).unwrap();
        assert_eq!(config.log_dir(), PathBuf::from("/tmp/autogest/logs"));
    }
}
