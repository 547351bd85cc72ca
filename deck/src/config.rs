//! demodeck configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding the upstream base URL
pub const UPSTREAM_URL_ENV: &str = "DEMODECK_UPSTREAM_URL";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "DEMODECK_PORT";

/// Longest accepted sorter return window (one day)
pub const MAX_RETURN_WINDOW_MS: u64 = 86_400_000;

/// Main demodeck configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Proxy HTTP server
    pub server: ServerConfig,

    /// Upstream user listing
    pub upstream: UpstreamConfig,

    /// Timed sorting board
    pub sorter: SorterConfig,

    /// Data explorer view
    pub explorer: ExplorerConfig,
}

impl Config {
    /// Load configuration with fallback chain, then apply env overrides
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let mut config = Self::load_file_chain(config_path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the sorter misbehave
    pub fn validate(&self) -> Result<()> {
        self.sorter.validate()
    }

    /// Read only the log level, before logging is initialized
    ///
    /// Errors are swallowed; the full load reports them once logging is up.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        Self::load_file_chain(config_path).ok().and_then(|c| c.log_level)
    }

    fn load_file_chain(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .demodeck.yml
        let local_config = PathBuf::from(".demodeck.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/demodeck/demodeck.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("demodeck").join("demodeck.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Apply `DEMODECK_UPSTREAM_URL` and `DEMODECK_PORT` if set
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(UPSTREAM_URL_ENV) {
            debug!(%url, "apply_env_overrides: upstream url from env");
            self.upstream.base_url = url;
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            debug!(%port, "apply_env_overrides: port from env");
            self.server.port = port
                .trim()
                .parse()
                .context(format!("{} must be a port number, got '{}'", PORT_ENV, port))?;
        }
        Ok(())
    }
}

/// Proxy server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,

    /// TCP port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// Resolve host and port into a socket address
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context(format!("Invalid listen address {}:{}", self.host, self.port))
    }
}

/// Upstream listing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// API base URL; `/users` is appended
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dummyjson.com".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Sorting board configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SorterConfig {
    /// How long an item stays in a category before returning to the pool
    #[serde(rename = "return-window-ms")]
    pub return_window_ms: u64,

    /// Expiry check cadence
    #[serde(rename = "tick-ms")]
    pub tick_ms: u64,
}

impl Default for SorterConfig {
    fn default() -> Self {
        Self {
            return_window_ms: 5_000,
            tick_ms: 250,
        }
    }
}

impl SorterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.return_window_ms > MAX_RETURN_WINDOW_MS {
            eyre::bail!(
                "sorter.return-window-ms must be at most {} (one day), got {}",
                MAX_RETURN_WINDOW_MS,
                self.return_window_ms
            );
        }
        Ok(())
    }

    /// Return window, capped at `MAX_RETURN_WINDOW_MS`
    pub fn return_window(&self) -> chrono::TimeDelta {
        let capped = self.return_window_ms.min(MAX_RETURN_WINDOW_MS);
        i64::try_from(capped)
            .ok()
            .and_then(chrono::TimeDelta::try_milliseconds)
            .unwrap_or_else(|| chrono::TimeDelta::days(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

/// Explorer view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Records requested per page
    #[serde(rename = "page-size")]
    pub page_size: u32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}
