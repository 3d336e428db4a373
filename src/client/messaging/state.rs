//! Messaging State
//!
//! The observable state of the message store and the bookkeeping that keeps
//! loading flags and overlapping fetches honest.

use crate::shared::messaging::{Message, User};
use tokio::sync::watch;

/// Whether the store has a listener on the realtime channel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    #[default]
    Unsubscribed,
    Subscribed {
        /// Partner whose pushed messages are delivered; follows the selection
        partner_id: String,
    },
}

/// Snapshot of everything the UI renders from
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    /// Conversation partners, in server order
    pub users: Vec<User>,
    /// Messages of the active conversation, in arrival order
    pub messages: Vec<Message>,
    /// The active conversation partner
    pub selected_user: Option<User>,
    pub is_users_loading: bool,
    pub is_messages_loading: bool,
    pub subscription: SubscriptionState,

    pub(crate) pending: Pending,
}

impl ChatState {
    pub fn selected_user_id(&self) -> Option<&str> {
        self.selected_user.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_subscribed(&self) -> bool {
        matches!(self.subscription, SubscriptionState::Subscribed { .. })
    }

    /// Append unless a message with the same id is already present.
    ///
    /// While a history fetch is outstanding the message is also remembered
    /// so the fetched history does not wipe it out.
    pub(crate) fn push_message(&mut self, message: Message) -> bool {
        if contains_message(&self.messages, &message) {
            return false;
        }
        if self.pending.messages_in_flight > 0 {
            self.pending.live_tail.push(message.clone());
        }
        self.messages.push(message);
        true
    }

    /// Replace the history with a fetched one, keeping live messages for
    /// `partner_id` that arrived while it was in flight.
    pub(crate) fn replace_history(&mut self, partner_id: &str, mut history: Vec<Message>) {
        for message in std::mem::take(&mut self.pending.live_tail) {
            if message.involves(partner_id) && !contains_message(&history, &message) {
                history.push(message);
            }
        }
        self.messages = history;
    }
}

fn contains_message(messages: &[Message], message: &Message) -> bool {
    !message.id.is_empty() && messages.iter().any(|m| m.id == message.id)
}

/// Request sequences, in-flight counts and the subscription epoch
#[derive(Debug, Clone, Default)]
pub(crate) struct Pending {
    users_in_flight: usize,
    messages_in_flight: usize,
    users_seq: u64,
    messages_seq: u64,
    live_tail: Vec<Message>,
    pub(crate) epoch: u64,
}

impl Pending {
    /// Whether `seq` is still the newest request of its kind
    pub(crate) fn is_latest(&self, kind: FetchKind, seq: u64) -> bool {
        match kind {
            FetchKind::Users => self.users_seq == seq,
            FetchKind::Messages => self.messages_seq == seq,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FetchKind {
    Users,
    Messages,
}

/// Marks one fetch as outstanding for as long as it lives.
///
/// The loading flag of its kind is true while any guard of that kind
/// exists. Dropping the guard (on success, failure or cancellation of the
/// enclosing future) releases it.
pub(crate) struct LoadingGuard<'a> {
    state: &'a watch::Sender<ChatState>,
    kind: FetchKind,
    seq: u64,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn begin(state: &'a watch::Sender<ChatState>, kind: FetchKind) -> Self {
        let mut seq = 0;
        state.send_modify(|s| {
            let pending = &mut s.pending;
            match kind {
                FetchKind::Users => {
                    pending.users_in_flight += 1;
                    pending.users_seq += 1;
                    seq = pending.users_seq;
                    s.is_users_loading = true;
                }
                FetchKind::Messages => {
                    pending.messages_in_flight += 1;
                    pending.messages_seq += 1;
                    seq = pending.messages_seq;
                    s.is_messages_loading = true;
                }
            }
        });
        Self { state, kind, seq }
    }

    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let kind = self.kind;
        self.state.send_modify(|s| {
            let pending = &mut s.pending;
            match kind {
                FetchKind::Users => {
                    pending.users_in_flight = pending.users_in_flight.saturating_sub(1);
                    s.is_users_loading = pending.users_in_flight > 0;
                }
                FetchKind::Messages => {
                    pending.messages_in_flight = pending.messages_in_flight.saturating_sub(1);
                    if pending.messages_in_flight == 0 {
                        pending.live_tail.clear();
                    }
                    s.is_messages_loading = pending.messages_in_flight > 0;
                }
            }
        });
    }
}
