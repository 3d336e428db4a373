//! Shared Error Types
//!
//! This module defines the error type returned by the network and realtime
//! collaborators of the message store.
//!
//! # Error Categories
//!
//! - `Request` - the server answered with a non-success status
//! - `Transport` - the request never produced a response
//! - `Serialization` - JSON serialization/deserialization failures
//! - `ChannelUnavailable` - no realtime channel is connected
//!
//! # Usage
//!
//! ```rust
//! use chat_sync::shared::error::SyncError;
//!
//! let error = SyncError::request(500, Some("Internal server error".to_string()));
//! assert_eq!(error.server_message(), Some("Internal server error"));
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use thiserror::Error;

/// Errors produced by the store's collaborators
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The server rejected the request
    #[error("Request failed with status {status}{}", suffix(.message))]
    Request {
        /// HTTP status code
        status: u16,
        /// User-facing message supplied by the server, if any
        message: Option<String>,
    },

    /// Network-level failure (connection refused, timeout, ...)
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable error message
        message: String,
    },

    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },

    /// No realtime channel is connected yet
    #[error("Realtime channel is not connected")]
    ChannelUnavailable,
}

impl SyncError {
    /// Create a new request error
    pub fn request(status: u16, message: Option<String>) -> Self {
        Self::Request { status, message }
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// The message the server attached to a rejected request.
    ///
    /// Only `Request` errors carry one; everything else falls back to the
    /// caller's generic text.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Request { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }

    /// Text to show the user: the server message or `fallback`
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_message().unwrap_or(fallback)
    }
}

fn suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::serialization(err.to_string());
        }
        match err.status() {
            Some(status) => Self::request(status.as_u16(), None),
            None => Self::transport(err.to_string()),
        }
    }
}
