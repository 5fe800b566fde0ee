//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};
use writedeck_core::ProxyConfig;

/// Application configuration stored in config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL the tool endpoint paths are resolved against
    pub base_url: String,
    /// Model sent to model-aware tools when `--model` is not given
    pub default_model: String,
    /// TCP connect timeout for generation requests, in seconds
    pub connect_timeout_secs: u64,
    /// Optional proxy URL (`http://`, `https://` or `socks5://`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Copy every completed run's output to the clipboard
    #[serde(default)]
    pub copy_to_clipboard: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            connect_timeout_secs: 30,
            proxy: None,
            copy_to_clipboard: false,
        }
    }
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub base_url: Option<String>,
    pub default_model: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    /// An empty string removes the proxy
    pub proxy: Option<String>,
    pub copy_to_clipboard: Option<bool>,
}

impl SettingsUpdate {
    /// Build an update from a single `key value` pair as typed on the
    /// command line.
    pub fn from_pair(key: &str, value: &str) -> Result<Self, String> {
        let mut update = Self::default();
        match key {
            "base_url" => update.base_url = Some(value.to_string()),
            "default_model" => update.default_model = Some(value.to_string()),
            "connect_timeout_secs" => {
                let secs = value
                    .parse()
                    .map_err(|_| format!("connect_timeout_secs must be a number, got '{}'", value))?;
                update.connect_timeout_secs = Some(secs);
            }
            "proxy" => update.proxy = Some(value.to_string()),
            "copy_to_clipboard" => {
                let flag = value
                    .parse()
                    .map_err(|_| format!("copy_to_clipboard must be true or false, got '{}'", value))?;
                update.copy_to_clipboard = Some(flag);
            }
            other => {
                return Err(format!(
                    "Unknown setting: {}. Expected one of: {}",
                    other,
                    AppConfig::KEYS.join(", ")
                ))
            }
        }
        Ok(update)
    }
}

impl AppConfig {
    /// Setting names accepted by `config set`
    pub const KEYS: &'static [&'static str] = &[
        "base_url",
        "default_model",
        "connect_timeout_secs",
        "proxy",
        "copy_to_clipboard",
    ];

    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(base_url) = update.base_url {
            self.base_url = base_url;
        }
        if let Some(model) = update.default_model {
            self.default_model = model;
        }
        if let Some(secs) = update.connect_timeout_secs {
            self.connect_timeout_secs = secs;
        }
        if let Some(proxy) = update.proxy {
            self.proxy = if proxy.trim().is_empty() {
                None
            } else {
                Some(proxy)
            };
        }
        if let Some(copy) = update.copy_to_clipboard {
            self.copy_to_clipboard = copy;
        }
    }

    /// Parsed proxy settings, if a proxy is configured
    pub fn proxy_config(&self) -> Result<Option<ProxyConfig>, String> {
        self.proxy
            .as_deref()
            .map(|raw| ProxyConfig::parse(raw).map_err(|e| e.to_string()))
            .transpose()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        // Validate base_url
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base_url '{}': {}", self.base_url, e))?;
        if !["http", "https"].contains(&parsed.scheme()) {
            return Err(format!(
                "Invalid base_url: {}. Must use http or https",
                self.base_url
            ));
        }

        if self.default_model.trim().is_empty() {
            return Err("default_model cannot be empty".to_string());
        }

        // Validate connect_timeout_secs
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 300 {
            return Err("connect_timeout_secs must be between 1 and 300".to_string());
        }

        self.proxy_config()?;

        Ok(())
    }
}
