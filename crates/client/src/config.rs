//! Client configuration from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_API_URL: &str = "ITAM_API_URL";
const ENV_TOKEN_FILE: &str = "ITAM_TOKEN_FILE";
const ENV_TIMEOUT: &str = "ITAM_HTTP_TIMEOUT_SECS";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of seconds, got '{value}'")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("{var} must be an http(s) URL, got '{value}'")]
    InvalidUrl { var: &'static str, value: String },

    #[error("could not resolve a data directory for the token file; set {0}")]
    NoDataDir(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token_path: PathBuf,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Read `ITAM_API_URL`, `ITAM_TOKEN_FILE` and `ITAM_HTTP_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_url = get(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                var: ENV_API_URL,
                value: api_url,
            });
        }

        let request_timeout = match get(ENV_TIMEOUT) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidTimeout {
                        var: ENV_TIMEOUT,
                        value: raw,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let token_path = match get(ENV_TOKEN_FILE) {
            Some(path) => PathBuf::from(path),
            None => default_token_path().ok_or(ConfigError::NoDataDir(ENV_TOKEN_FILE))?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token_path,
            request_timeout,
        })
    }
}

/// `<data_dir>/itam/token`, falling back to `~/.local/share`.
pub fn default_token_path() -> Option<PathBuf> {
    let mut dir = dirs::data_dir().or_else(|| {
        dirs::home_dir().map(|mut h| {
            h.push(".local");
            h.push("share");
            h
        })
    })?;
    dir.push("itam");
    dir.push("token");
    Some(dir)
}
