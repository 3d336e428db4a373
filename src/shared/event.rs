/**
 * Real-time Event Payloads
 *
 * Events pushed by the server over the realtime channel. Each event has a
 * name and a JSON payload; this module knows how to decode the ones the
 * message store listens for.
 */
use crate::shared::error::SyncError;
use crate::shared::messaging::Message;
use serde::{Deserialize, Serialize};

/// Event name for messages pushed to the receiver
pub const NEW_MESSAGE_EVENT: &str = "newMessage";

/// Payload of a `newMessage` event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub new_message: Message,
}

impl NewMessageEvent {
    pub fn new(new_message: Message) -> Self {
        Self { new_message }
    }

    /// Decode a raw channel payload
    pub fn from_payload(payload: serde_json::Value) -> Result<Self, SyncError> {
        Ok(serde_json::from_value(payload)?)
    }

    /// Encode for emitting on a channel
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({ "newMessage": self.new_message })
    }
}
