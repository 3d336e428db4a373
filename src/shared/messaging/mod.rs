//! Messaging Types
//!
//! Wire types for the two-party chat API.

pub mod message;
pub mod user;

pub use message::{Message, OutgoingMessage};
pub use user::User;
