use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::core::sentiment::Capacities;
use crate::error::DashError;

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const LIVE_PATH: &str = "/ws/live";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend REST base, e.g. `http://localhost:8000`
    pub api_base: String,
    /// Explicit stream URL; derived from `api_base` when unset
    pub ws_url: Option<String>,
    /// Redraw interval of the dashboard
    pub tick_rate_ms: u64,
    pub feed_capacity: usize,
    pub trend_capacity: usize,
    pub alert_capacity: usize,
    /// Extra attempts for each startup/refresh fetch
    pub fetch_retries: u32,
    pub fetch_retry_delay_ms: u64,
    pub reconnect: ReconnectPolicy,
}

impl Default for Config {
    fn default() -> Self {
        let capacities = Capacities::default();
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            ws_url: None,
            tick_rate_ms: 250,
            feed_capacity: capacities.feed,
            trend_capacity: capacities.trend,
            alert_capacity: capacities.alerts,
            fetch_retries: 2,
            fetch_retry_delay_ms: 1000,
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Backoff applied when the live stream drops or fails to open
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Give up after this many consecutive failures; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnect attempt `attempt` (1-based), doubling each time
    /// up to `max_delay_ms`. `None` once the policy gives up.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        if let Some(max) = self.max_attempts {
            if attempt > max {
                return None;
            }
        }

        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        let delay = self
            .initial_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Some(Duration::from_millis(delay))
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from `path`. A missing, empty or unreadable-as-JSON file yields
    /// the default configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config file {:?}: {}", path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("sentiment-dash").join("config.json"))
    }

    pub fn set_api_base(&mut self, api_base: &str) -> crate::Result<()> {
        self.api_base = validate_http_url(api_base)?;
        Ok(())
    }

    pub fn set_ws_url(&mut self, ws_url: &str) -> crate::Result<()> {
        self.ws_url = Some(validate_ws_url(ws_url)?);
        Ok(())
    }

    /// Stream URL: the explicit `ws_url`, or `api_base` with its scheme
    /// switched to `ws`/`wss` and the path set to `/ws/live`.
    pub fn live_url(&self) -> crate::Result<String> {
        if let Some(ws_url) = &self.ws_url {
            return validate_ws_url(ws_url);
        }

        let mut url = Url::parse(&self.api_base)
            .map_err(|e| DashError::config(format!("Invalid API base {:?}: {}", self.api_base, e)))?;

        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => {
                return Err(DashError::config(format!(
                    "Cannot derive a stream URL from scheme {:?}",
                    other
                )))
            }
        };

        url.set_scheme(scheme)
            .map_err(|_| DashError::config("Failed to switch URL scheme"))?;
        url.set_path(LIVE_PATH);
        url.set_query(None);

        Ok(url.to_string())
    }

    pub fn capacities(&self) -> Capacities {
        Capacities {
            feed: self.feed_capacity,
            trend: self.trend_capacity,
            alerts: self.alert_capacity,
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(16))
    }

    pub fn fetch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_delay_ms)
    }
}

/// Parse an `http`/`https` base URL, returning it without a trailing slash.
pub fn validate_http_url(raw: &str) -> crate::Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| DashError::config(format!("Invalid URL {:?}: {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url.as_str().trim_end_matches('/').to_string()),
        other => Err(DashError::config(format!(
            "API URL must use http or https, got {:?}",
            other
        ))),
    }
}

/// Parse a `ws`/`wss` URL.
pub fn validate_ws_url(raw: &str) -> crate::Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| DashError::config(format!("Invalid URL {:?}: {}", raw, e)))?;

    match url.scheme() {
        "ws" | "wss" => Ok(url.to_string()),
        other => Err(DashError::config(format!(
            "Stream URL must use ws or wss, got {:?}",
            other
        ))),
    }
}
