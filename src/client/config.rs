use crate::shared::config::{AppConfig, AppConfigBuilder, ConfigError};

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5001/api";

/// Environment variable overriding the server URL
pub const SERVER_URL_ENV: &str = "CLIENT_API_URL";

/// Client configuration: the file/builder settings plus session credentials.
#[derive(Debug, Clone, Default)]
pub struct Config {
    app: AppConfig,
    token: Option<String>,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builder(builder: AppConfigBuilder) -> Result<Self, ConfigError> {
        Ok(Self::from_app(builder.build()?))
    }

    pub fn from_app(app: AppConfig) -> Self {
        Self { app, token: None }
    }

    /// Apply `CLIENT_API_URL` on top of the given settings
    pub fn from_env(mut app: AppConfig) -> Result<Self, ConfigError> {
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            app.server_url = Some(url);
        }
        app.validate()?;
        Ok(Self::from_app(app))
    }

    /// Set the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the bearer token
    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    /// Clear the token (logout)
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server_url().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn inbound_queue_capacity(&self) -> usize {
        self.app.inbound_queue_capacity
    }

    pub fn clear_messages_on_switch(&self) -> bool {
        self.app.clear_messages_on_switch
    }
}
