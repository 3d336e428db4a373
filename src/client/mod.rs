//! Client Module
//!
//! The message store and the collaborators it is built from:
//!
//! - [`api`] - HTTP access to the chat API
//! - [`realtime`] - the push channel seam
//! - [`notifier`] - user-facing error display
//! - [`messaging`] - the store itself

pub mod api;
pub mod config;
pub mod messaging;
pub mod notifier;
pub mod realtime;

pub use api::{HttpClient, NetworkClient};
pub use config::Config;
pub use messaging::{
    ChatState, MessageStore, SubscriptionState, FETCH_MESSAGES_FAILED, FETCH_USERS_FAILED,
    SEND_MESSAGE_FAILED,
};
pub use notifier::{Notifier, TracingNotifier};
pub use realtime::{fixed_channel, ChannelProvider, EventHandler, LocalChannel, RealtimeChannel};
