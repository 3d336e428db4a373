//! Application configuration module
//!
//! Provides configuration types for the client, loadable from a TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default capacity of the inbound realtime queue
pub const DEFAULT_INBOUND_QUEUE_CAPACITY: usize = 256;

/// Application configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Server URL, including the API prefix
    pub server_url: Option<String>,
    /// How many realtime events may wait for dispatch before new ones are dropped
    pub inbound_queue_capacity: usize,
    /// Clear the visible history when switching conversations instead of
    /// keeping it until the new history arrives
    pub clear_messages_on_switch: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            inbound_queue_capacity: DEFAULT_INBOUND_QUEUE_CAPACITY,
            clear_messages_on_switch: false,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(url.clone()));
            }
        }
        if self.inbound_queue_capacity == 0 {
            return Err(ConfigError::MissingValue("inbound_queue_capacity"));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Load from the default location, or defaults if no file exists
    pub fn load_default() -> Result<Self, ConfigError> {
        match default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

/// Platform-specific configuration file path
pub fn default_config_path() -> Option<PathBuf> {
    let mut path = dirs::config_dir()?;
    path.push("chat-sync");
    path.push("config.toml");
    Some(path)
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_url: Option<String>,
    inbound_queue_capacity: Option<usize>,
    clear_messages_on_switch: Option<bool>,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: String) -> Self {
        self.server_url = Some(url);
        self
    }

    /// Set the inbound queue capacity
    pub fn inbound_queue_capacity(mut self, capacity: usize) -> Self {
        self.inbound_queue_capacity = Some(capacity);
        self
    }

    /// Clear history on conversation switch
    pub fn clear_messages_on_switch(mut self, clear: bool) -> Self {
        self.clear_messages_on_switch = Some(clear);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            server_url: self.server_url,
            inbound_queue_capacity: self
                .inbound_queue_capacity
                .unwrap_or(defaults.inbound_queue_capacity),
            clear_messages_on_switch: self
                .clear_messages_on_switch
                .unwrap_or(defaults.clear_messages_on_switch),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}
