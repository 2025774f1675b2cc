//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: where
//! the API lives, which backend stores session tokens, whether logs are
//! also written to disk, and the last email used to log in.
//!
//! Configuration is stored at `~/.config/strayward/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "strayward";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable naming the API base (build time and run time).
pub const API_URL_ENV: &str = "STRAYWARD_API_URL";

/// API base path baked in at build time, `/api` when unset.
pub const DEFAULT_API_BASE: &str = match option_env!("STRAYWARD_API_URL") {
    Some(url) => url,
    None => "/api",
};

/// Origin a relative API base is resolved against.
/// The development server serves both `/api` and `/uploads` from here.
pub const DEFAULT_SERVER_ORIGIN: &str = "http://localhost:8000";

/// Where the session token pair is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    /// JSON file in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Process memory only; every run starts anonymous
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_origin: String,
    pub api_base: String,
    pub token_store: TokenStoreKind,
    pub log_to_file: bool,
    /// Offered as the default on the next login prompt
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_origin: DEFAULT_SERVER_ORIGIN.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            token_store: TokenStoreKind::default(),
            log_to_file: false,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
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
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply a run-time API base override (environment or command line).
    pub fn with_api_base(mut self, api_base: Option<String>) -> Self {
        if let Some(base) = api_base.filter(|b| !b.trim().is_empty()) {
            self.api_base = base;
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Absolute URL every API path is appended to.
    pub fn api_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        if is_absolute(base) {
            base.to_string()
        } else {
            join_origin(&self.server_origin, base)
        }
    }

    /// Resolve an image path returned by the API (`/uploads/...`) to a URL.
    pub fn image_url(&self, image_path: &str) -> String {
        if is_absolute(image_path) {
            image_path.to_string()
        } else {
            join_origin(&self.server_origin, image_path)
        }
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn join_origin(origin: &str, path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    if path.is_empty() {
        origin.to_string()
    } else if path.starts_with('/') {
        format!("{}{}", origin, path)
    } else {
        format!("{}/{}", origin, path)
    }
}
