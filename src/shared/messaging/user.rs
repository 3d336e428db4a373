//! Conversation Partner
//!
//! Represents a user the current account can chat with.

use serde::{Deserialize, Serialize};

/// A conversation partner as returned by `GET /messages/users`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub full_name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Avatar URL, empty when the user has none
    #[serde(default)]
    pub profile_pic: String,
}

impl User {
    /// Create a user with only an identity
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: String::new(),
            email: String::new(),
            profile_pic: String::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Name to show in lists, falling back to the email
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.email
        } else {
            &self.full_name
        }
    }
}
