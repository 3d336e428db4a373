//! Chat API Client
//!
//! The store talks to the server through [`NetworkClient`]. [`HttpClient`]
//! is the `reqwest` implementation; tests substitute their own.

use crate::client::config::Config;
use crate::shared::error::SyncError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

/// Partner list
pub const USERS_PATH: &str = "/messages/users";

/// History with one partner
pub fn messages_path(user_id: &str) -> String {
    format!("/messages/{}", user_id)
}

/// Send to one partner
pub fn send_path(user_id: &str) -> String {
    format!("/messages/send/{}", user_id)
}

/// Minimal HTTP contract: resolve to the response data or fail.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    async fn get(&self, path: &str) -> Result<serde_json::Value, SyncError>;

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, SyncError>;
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// HTTP client for the chat API
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: Config,
    client: Client,
}

impl HttpClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.get_token() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn read(response: Response) -> Result<serde_json::Value, SyncError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            tracing::debug!("Request failed: {} - {}", status, body);
            return Err(SyncError::request(status.as_u16(), message));
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[async_trait]
impl NetworkClient for HttpClient {
    async fn get(&self, path: &str) -> Result<serde_json::Value, SyncError> {
        let url = self.config.api_url(path);
        tracing::debug!("GET {}", url);

        let response = self.authorize(self.client.get(&url)).send().await?;
        Self::read(response).await
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, SyncError> {
        let url = self.config.api_url(path);
        tracing::debug!("POST {}", url);

        let response = self
            .authorize(self.client.post(&url))
            .json(&body)
            .send()
            .await?;
        Self::read(response).await
    }
}
