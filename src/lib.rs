//! chat-sync - Client-side state synchronization for two-party chat
//!
//! This library keeps three things consistent while the user switches
//! conversations and messages arrive or are sent:
//!
//! - the list of conversation partners
//! - the message history of the open conversation
//! - a live subscription to messages pushed over the realtime channel
//!
//! # Module Structure
//!
//! - **`shared`** - wire types, realtime payloads, errors, configuration
//! - **`client`** - the [`client::MessageStore`] and its collaborators
//!   (network client, realtime channel, notifier)
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chat_sync::client::{
//!     fixed_channel, Config, HttpClient, LocalChannel, MessageStore, RealtimeChannel,
//!     TracingNotifier,
//! };
//! use chat_sync::shared::{OutgoingMessage, User};
//!
//! # async fn example() {
//! let config = Config::new();
//! let channel: Arc<dyn RealtimeChannel> = Arc::new(LocalChannel::new());
//! let store = Arc::new(MessageStore::new(
//!     Arc::new(HttpClient::new(config.clone())),
//!     Arc::new(fixed_channel(Some(channel))),
//!     Arc::new(TracingNotifier),
//!     &config,
//! ));
//!
//! let dispatcher = store.clone();
//! tokio::spawn(async move { dispatcher.run_dispatch().await });
//!
//! store.get_users().await;
//! store.open_conversation(User::new("u2")).await;
//! store.send_message(OutgoingMessage::text("hello")).await;
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The store is `Send + Sync`. State lives behind a `tokio::sync::watch`
//! channel; every mutation is applied atomically and observers are woken
//! after it.
//!
//! # Error Handling
//!
//! Store operations do not return errors. Failures are logged with
//! `tracing` and shown through the [`client::Notifier`]. Collaborators use
//! [`shared::SyncError`].

/// Shared types and data structures
pub mod shared;

/// Message store and collaborators
pub mod client;
