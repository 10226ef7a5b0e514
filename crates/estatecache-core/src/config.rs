//! Application configuration management.
//!
//! Configuration is stored at `~/.config/estatecache/config.json`.
//! Environment variables override the file:
//! - `ESTATECACHE_API_URL`, then `NEXT_PUBLIC_API_URL`: API base URL
//! - `ESTATECACHE_TOKEN`: bearer token

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_API_URL, REQUEST_TIMEOUT_SECS};
use crate::filters::DEFAULT_DEBOUNCE;

/// Application name used for config directory paths
const APP_NAME: &str = "estatecache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variables checked for the API base URL, in order.
const API_URL_VARS: [&str; 2] = ["ESTATECACHE_API_URL", "NEXT_PUBLIC_API_URL"];

const TOKEN_VAR: &str = "ESTATECACHE_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    pub debounce_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Read the config file if present, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Read only the config file, without environment overrides.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = API_URL_VARS.iter().find_map(|name| non_empty(*name)) {
            self.api_url = Some(url);
        }
        if let Some(token) = non_empty(TOKEN_VAR) {
            self.token = Some(token);
        }
    }

    pub fn api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_URL)
    }

    pub fn debounce(&self) -> Duration {
        self.debounce_ms.map(Duration::from_millis).unwrap_or(DEFAULT_DEBOUNCE)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(REQUEST_TIMEOUT_SECS))
    }
}
