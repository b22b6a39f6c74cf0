//! Configuration management for crawl-middleware
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// Capacity of each of the four bus channels
pub const DEFAULT_CHANNEL_LEN: usize = 64;

/// Number of pooled page downloaders
pub const DEFAULT_DOWNLOADER_POOL_SIZE: u32 = 8;

/// Number of pooled response analyzers
pub const DEFAULT_ANALYZER_POOL_SIZE: u32 = 8;

/// Per-request download timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log format
pub const DEFAULT_LOG_FORMAT: &str = "text";

const LOG_FORMATS: [&str; 2] = ["text", "json"];

fn default_user_agent() -> String {
    format!("crawl-middleware/{}", env!("CARGO_PKG_VERSION"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Pool and bus sizing
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Sizing for pools, channels and downloaders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiddlewareConfig {
    /// Capacity of each bus channel
    pub channel_len: usize,

    /// Number of downloaders in the downloader pool
    pub downloader_pool_size: u32,

    /// Number of analyzers in the analyzer pool
    pub analyzer_pool_size: u32,

    /// User agent string
    pub user_agent: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            channel_len: DEFAULT_CHANNEL_LEN,
            downloader_pool_size: DEFAULT_DOWNLOADER_POOL_SIZE,
            analyzer_pool_size: DEFAULT_ANALYZER_POOL_SIZE,
            user_agent: default_user_agent(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from(DEFAULT_LOG_LEVEL),
            format: String::from(DEFAULT_LOG_FORMAT),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset variables fall back to the `DEFAULT_*` constants. Set but
    /// unparsable numeric values are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = MiddlewareConfig::default();

        let channel_len = env_parse("CRAWL_CHANNEL_LEN")?.unwrap_or(defaults.channel_len);
        let downloader_pool_size =
            env_parse("CRAWL_DOWNLOADER_POOL_SIZE")?.unwrap_or(defaults.downloader_pool_size);
        let analyzer_pool_size =
            env_parse("CRAWL_ANALYZER_POOL_SIZE")?.unwrap_or(defaults.analyzer_pool_size);
        let request_timeout_secs =
            env_parse("CRAWL_REQUEST_TIMEOUT")?.unwrap_or(defaults.request_timeout_secs);

        let user_agent = std::env::var("CRAWL_USER_AGENT").unwrap_or(defaults.user_agent);

        let log_level =
            std::env::var("CRAWL_LOG_LEVEL").unwrap_or_else(|_| String::from(DEFAULT_LOG_LEVEL));

        let log_format =
            std::env::var("CRAWL_LOG_FORMAT").unwrap_or_else(|_| String::from(DEFAULT_LOG_FORMAT));

        Ok(Self {
            middleware: MiddlewareConfig {
                channel_len,
                downloader_pool_size,
                analyzer_pool_size,
                user_agent,
                request_timeout_secs,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.middleware.channel_len == 0 {
            return Err(Error::config("channel_len must be greater than 0"));
        }

        if self.middleware.downloader_pool_size == 0 {
            return Err(Error::config("downloader_pool_size must be greater than 0"));
        }

        if self.middleware.analyzer_pool_size == 0 {
            return Err(Error::config("analyzer_pool_size must be greater than 0"));
        }

        if self.middleware.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be greater than 0"));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(Error::config(format!(
                "unknown log format '{}', expected one of {LOG_FORMATS:?}",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.middleware.request_timeout_secs)
    }
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Invalid value for {key}: {raw:?}")),
        Err(_) => Ok(None),
    }
}
