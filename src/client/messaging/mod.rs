//! Messaging Module
//!
//! The message store: partner list, active conversation and the realtime
//! subscription that keeps it current.

pub mod state;
pub mod store;
pub mod subscription;

pub use state::{ChatState, SubscriptionState};
pub use store::{MessageStore, FETCH_MESSAGES_FAILED, FETCH_USERS_FAILED, SEND_MESSAGE_FAILED};
