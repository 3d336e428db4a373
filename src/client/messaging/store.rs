//! Message Store
//!
//! Holds the partner list, the active conversation and the loading flags,
//! and keeps them in sync with the server. One store exists per session and
//! is shared by reference (usually an `Arc`) with whatever renders it.
//!
//! # Concurrency
//!
//! Every mutation is a single `watch::Sender::send_modify`, so observers
//! never see a half-applied update. Fetches may overlap; each one carries a
//! per-kind sequence number and only the newest request of a kind may write
//! its result. Older responses are dropped.

use super::state::{ChatState, FetchKind, LoadingGuard, SubscriptionState};
use super::subscription::Inbound;
use crate::client::api::{messages_path, send_path, NetworkClient, USERS_PATH};
use crate::client::config::Config;
use crate::client::notifier::Notifier;
use crate::client::realtime::{ChannelProvider, RealtimeChannel};
use crate::shared::error::SyncError;
use crate::shared::messaging::{Message, OutgoingMessage, User};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

pub const FETCH_USERS_FAILED: &str = "Failed to fetch users";
pub const FETCH_MESSAGES_FAILED: &str = "Failed to fetch messages";
pub const SEND_MESSAGE_FAILED: &str = "Failed to send message";

/// Client-side state for the chat feature
pub struct MessageStore {
    network: Arc<dyn NetworkClient>,
    pub(super) channels: Arc<dyn ChannelProvider>,
    notifier: Arc<dyn Notifier>,
    pub(super) state: watch::Sender<ChatState>,
    /// Channel the inbound listener is attached to, if any
    pub(super) attached: Mutex<Option<Arc<dyn RealtimeChannel>>>,
    pub(super) inbound_tx: mpsc::Sender<Inbound>,
    pub(super) inbound_rx: tokio::sync::Mutex<mpsc::Receiver<Inbound>>,
    clear_messages_on_switch: bool,
}

impl MessageStore {
    pub fn new(
        network: Arc<dyn NetworkClient>,
        channels: Arc<dyn ChannelProvider>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(config.inbound_queue_capacity().max(1));
        Self {
            network,
            channels,
            notifier,
            state: watch::Sender::new(ChatState::default()),
            attached: Mutex::new(None),
            inbound_tx,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            clear_messages_on_switch: config.clear_messages_on_switch(),
        }
    }

    /// Receiver that is notified on every state change
    pub fn watch(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// Load the partner list
    pub async fn get_users(&self) {
        let loading = LoadingGuard::begin(&self.state, FetchKind::Users);
        let seq = loading.seq();

        match self.fetch::<Vec<User>>(USERS_PATH).await {
            Ok(users) => {
                let count = users.len();
                let applied = self.state.send_if_modified(|s| {
                    if !s.pending.is_latest(FetchKind::Users, seq) {
                        return false;
                    }
                    s.users = users;
                    true
                });
                if applied {
                    tracing::debug!("Loaded {} conversation partners", count);
                } else {
                    tracing::debug!("Discarding stale partner list (request {})", seq);
                }
            }
            Err(e) => {
                if self.state.borrow().pending.is_latest(FetchKind::Users, seq) {
                    self.report(&e, FETCH_USERS_FAILED);
                } else {
                    tracing::debug!("Ignoring failure of stale partner list request {}: {}", seq, e);
                }
            }
        }
    }

    /// Load the history with `user_id`.
    ///
    /// Leaves the selection alone and keeps the current messages visible
    /// until the history arrives.
    pub async fn get_messages(&self, user_id: &str) {
        let loading = LoadingGuard::begin(&self.state, FetchKind::Messages);
        let seq = loading.seq();

        match self.fetch::<Vec<Message>>(&messages_path(user_id)).await {
            Ok(history) => {
                let applied = self.state.send_if_modified(|s| {
                    if !s.pending.is_latest(FetchKind::Messages, seq) {
                        return false;
                    }
                    if s.selected_user_id().is_some_and(|id| id != user_id) {
                        return false;
                    }
                    s.replace_history(user_id, history);
                    true
                });
                if !applied {
                    tracing::debug!(
                        "Discarding stale history for {} (request {})",
                        user_id,
                        seq
                    );
                }
            }
            Err(e) => {
                if self.state.borrow().pending.is_latest(FetchKind::Messages, seq) {
                    self.report(&e, FETCH_MESSAGES_FAILED);
                } else {
                    tracing::debug!("Ignoring failure of stale history request {}: {}", seq, e);
                }
            }
        }
    }

    /// Send a message to the selected partner and append the server's copy
    pub async fn send_message(&self, message: OutgoingMessage) {
        let partner_id = self.state.borrow().selected_user_id().map(str::to_owned);
        let Some(partner_id) = partner_id else {
            tracing::warn!("send_message called with no conversation selected");
            self.notifier.error(SEND_MESSAGE_FAILED);
            return;
        };
        if message.is_empty() {
            tracing::warn!("Refusing to send an empty message to {}", partner_id);
            self.notifier.error(SEND_MESSAGE_FAILED);
            return;
        }

        match self.post::<Message, _>(&send_path(&partner_id), &message).await {
            Ok(sent) => {
                let sent_id = sent.id.clone();
                let appended = self.state.send_if_modified(|s| {
                    if s.selected_user_id() != Some(partner_id.as_str()) {
                        return false;
                    }
                    s.push_message(sent)
                });
                if !appended {
                    tracing::debug!(
                        "Sent message {} not appended; conversation with {} is no longer open",
                        sent_id,
                        partner_id
                    );
                }
            }
            Err(e) => self.report(&e, SEND_MESSAGE_FAILED),
        }
    }

    /// Replace the active conversation partner.
    ///
    /// Does not fetch or reattach the listener; see
    /// [`MessageStore::open_conversation`]. An existing subscription follows
    /// the new partner. Clearing the selection leaves it pointing at the last
    /// partner until `unsubscribe_from_messages`.
    pub fn set_selected_user(&self, user: Option<User>) {
        let clear = self.clear_messages_on_switch;
        self.state.send_modify(|s| {
            let switched = s.selected_user.as_ref().map(|u| &u.id) != user.as_ref().map(|u| &u.id);
            if clear && switched {
                s.messages.clear();
            }
            if let (Some(user), SubscriptionState::Subscribed { partner_id }) =
                (&user, &mut s.subscription)
            {
                partner_id.clone_from(&user.id);
            }
            s.selected_user = user;
        });
    }

    /// Switch to `user`: select, move the realtime listener, load history.
    ///
    /// The listener is attached before the history request so messages
    /// pushed while it is in flight are not lost.
    pub async fn open_conversation(&self, user: User) {
        let user_id = user.id.clone();
        tracing::info!("Opening conversation with {}", user_id);

        self.set_selected_user(Some(user));
        self.unsubscribe_from_messages();
        self.subscribe_to_messages();
        self.get_messages(&user_id).await;
    }

    /// Leave the active conversation
    pub fn close_conversation(&self) {
        self.unsubscribe_from_messages();
        self.state.send_modify(|s| {
            s.selected_user = None;
            s.messages.clear();
        });
    }

    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let data = self.network.get(path).await?;
        Ok(serde_json::from_value(data)?)
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SyncError> {
        let body = serde_json::to_value(body)?;
        let data = self.network.post(path, body).await?;
        Ok(serde_json::from_value(data)?)
    }

    fn report(&self, error: &SyncError, fallback: &str) {
        tracing::error!("{}: {}", fallback, error);
        self.notifier.error(error.user_message(fallback));
    }
}

impl std::fmt::Debug for MessageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageStore")
            .field("state", &*self.state.borrow())
            .field("clear_messages_on_switch", &self.clear_messages_on_switch)
            .finish_non_exhaustive()
    }
}
