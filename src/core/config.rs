//! Client configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Default page size for paginated list requests.
pub const DEFAULT_PAGE_SIZE: usize = 24;

/// Default ordering for video lists (newest on the channel first).
pub const DEFAULT_ORDER: &str = "-channel_added_at";

/// Main client configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the catalog API, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    /// Items per page for list requests. Fixed for the lifetime of the
    /// stores built from this config.
    pub page_size: usize,
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Bearer token attached to every request when present.
    pub auth_token: Option<String>,
    /// Order field sent with video list requests.
    pub order: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout_seconds: 10,
            user_agent: "video-catalog-client/1.0".to_string(),
            auth_token: None,
            order: DEFAULT_ORDER.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the default location, creating it with
    /// defaults if it does not exist yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, creating it with defaults
    /// if it does not exist yet.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

            let config: ClientConfig =
                serde_json::from_str(&content).with_context(|| "Failed to parse config file")?;

            config.validate()?;
            tracing::info!("Loaded configuration from: {:?}", config_path);
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            tracing::info!("Created default configuration at: {:?}", config_path);
            Ok(config)
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        tracing::info!("Saved configuration to: {:?}", config_path);
        Ok(())
    }

    /// Path to the configuration file under the platform config directory.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "videocatalog", "client")
            .with_context(|| "Failed to get project directories")?;

        Ok(project_dirs.config_dir().join("config.json"))
    }

    /// Reset configuration to defaults and persist it.
    pub fn reset() -> Result<Self> {
        let config = Self::default();
        config.save()?;
        tracing::info!("Reset configuration to defaults");
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("page_size must be greater than zero");
        }
        if self.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be greater than zero");
        }
        Url::parse(&self.base_url)
            .with_context(|| format!("base_url is not a valid URL: {}", self.base_url))?;
        if self.order.is_empty() {
            anyhow::bail!("order must not be empty");
        }
        Ok(())
    }

    /// Parsed base URL, with a trailing slash so joins keep the `/api`
    /// path segment.
    pub fn base_url(&self) -> Result<Url> {
        let raw = if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        };
        Url::parse(&raw).with_context(|| format!("base_url is not a valid URL: {}", self.base_url))
    }
}
