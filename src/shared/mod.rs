//! Shared Module
//!
//! This module contains the types shared by every part of the client: wire
//! types for the chat API, realtime event payloads, errors and
//! configuration.
//!
//! # Overview
//!
//! These types carry no behavior beyond (de)serialization and validation.
//! They are what the network and realtime collaborators exchange with the
//! message store.

/// Messaging types (users, messages, outgoing payloads)
pub mod messaging;

/// Realtime event payloads
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::SyncError;
pub use event::{NewMessageEvent, NEW_MESSAGE_EVENT};
pub use messaging::{Message, OutgoingMessage, User};
