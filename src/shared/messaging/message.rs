//! Chat Message Data Structure
//!
//! Represents a message exchanged between two users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a chat message. Immutable once created by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    /// User who sent the message
    pub sender_id: String,
    /// User the message was sent to
    #[serde(default)]
    pub receiver_id: String,
    /// Message text
    #[serde(alias = "text", default)]
    pub content: String,
    /// Attached image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// When the server created the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a text message
    pub fn new(
        id: impl Into<String>,
        sender_id: impl Into<String>,
        receiver_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sender_id: sender_id.into(),
            receiver_id: receiver_id.into(),
            content: content.into(),
            image: None,
            created_at: None,
        }
    }

    /// Whether this message belongs to the conversation with `user_id`
    pub fn involves(&self, user_id: &str) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// Payload for `POST /messages/send/{userId}`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Message text
    #[serde(default)]
    pub content: String,
    /// Image as a URL or data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OutgoingMessage {
    /// Create a text-only payload
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            image: None,
        }
    }

    /// Attach an image
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Nothing to send
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.image.is_none()
    }
}
