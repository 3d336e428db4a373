//! Realtime Subscription
//!
//! Listener lifecycle for `newMessage` events and the inbound queue that
//! decouples channel delivery from state mutation.
//!
//! The listener registered on the channel only decodes the payload and
//! queues it. Queued events are applied by [`MessageStore::dispatch_pending`]
//! or by a task running [`MessageStore::run_dispatch`], one at a time and in
//! arrival order.
//!
//! Each subscription gets a new epoch. Events queued under an epoch that is
//! no longer current are discarded, so nothing from an old listener lands
//! after `unsubscribe_from_messages`.

use super::state::SubscriptionState;
use super::store::MessageStore;
use crate::shared::error::SyncError;
use crate::shared::event::{NewMessageEvent, NEW_MESSAGE_EVENT};
use crate::shared::messaging::Message;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// A pushed message waiting for dispatch
#[derive(Debug)]
pub(crate) struct Inbound {
    epoch: u64,
    message: Message,
}

impl MessageStore {
    /// Start appending pushed messages from the selected partner.
    ///
    /// No-op without a selected partner or a connected channel. When already
    /// subscribed the existing listener is kept and only re-targeted.
    pub fn subscribe_to_messages(&self) {
        let mut attached = self.attached.lock().unwrap_or_else(|p| p.into_inner());

        let Some(partner_id) = self.state.borrow().selected_user_id().map(str::to_owned) else {
            tracing::debug!("No conversation selected; not subscribing");
            return;
        };

        if attached.is_some() {
            tracing::debug!("Already subscribed; re-targeting to {}", partner_id);
            self.state.send_if_modified(|s| {
                let subscription = SubscriptionState::Subscribed { partner_id };
                if s.subscription == subscription {
                    return false;
                }
                s.subscription = subscription;
                true
            });
            return;
        }

        let Some(channel) = self.channels.channel() else {
            tracing::warn!("{}; not subscribing", SyncError::ChannelUnavailable);
            return;
        };

        let epoch = self.state.borrow().pending.epoch + 1;
        let tx = self.inbound_tx.clone();
        channel.on(
            NEW_MESSAGE_EVENT,
            Arc::new(move |payload| enqueue(&tx, epoch, payload)),
        );
        *attached = Some(channel);

        self.state.send_modify(|s| {
            s.pending.epoch = epoch;
            s.subscription = SubscriptionState::Subscribed {
                partner_id: partner_id.clone(),
            };
        });
        tracing::info!("Subscribed to {} for {} (epoch {})", NEW_MESSAGE_EVENT, partner_id, epoch);
    }

    /// Stop listening for pushed messages. Safe to call at any time.
    pub fn unsubscribe_from_messages(&self) {
        let mut attached = self.attached.lock().unwrap_or_else(|p| p.into_inner());

        match attached.take() {
            Some(channel) => {
                channel.off(NEW_MESSAGE_EVENT);
                tracing::info!("Unsubscribed from {}", NEW_MESSAGE_EVENT);
            }
            None => tracing::debug!("Not subscribed; nothing to detach"),
        }

        self.state.send_if_modified(|s| {
            if s.subscription == SubscriptionState::Unsubscribed {
                return false;
            }
            s.subscription = SubscriptionState::Unsubscribed;
            true
        });
    }

    /// Apply every queued event. Returns how many messages were appended.
    pub async fn dispatch_pending(&self) -> usize {
        let mut rx = self.inbound_rx.lock().await;
        let mut appended = 0;
        while let Ok(inbound) = rx.try_recv() {
            if self.apply_inbound(inbound) {
                appended += 1;
            }
        }
        appended
    }

    /// Apply queued events as they arrive.
    ///
    /// Never returns on its own: the store holds the queue's sender, so run
    /// it in a task and abort that task when the store is no longer needed.
    /// While it runs, `dispatch_pending` waits for it.
    pub async fn run_dispatch(&self) {
        let mut rx = self.inbound_rx.lock().await;
        while let Some(inbound) = rx.recv().await {
            self.apply_inbound(inbound);
        }
    }

    fn apply_inbound(&self, inbound: Inbound) -> bool {
        let Inbound { epoch, message } = inbound;
        let message_id = message.id.clone();

        let appended = self.state.send_if_modified(|s| {
            if !s.is_subscribed() || s.pending.epoch != epoch {
                return false;
            }
            if s.selected_user_id() != Some(message.sender_id.as_str()) {
                return false;
            }
            s.push_message(message)
        });

        if !appended {
            tracing::trace!("Discarded pushed message {}", message_id);
        }
        appended
    }
}

/// Channel listener body: decode and queue, never touch state
fn enqueue(tx: &mpsc::Sender<Inbound>, epoch: u64, payload: serde_json::Value) {
    let event = match NewMessageEvent::from_payload(payload) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping malformed {} event: {}", NEW_MESSAGE_EVENT, e);
            return;
        }
    };

    match tx.try_send(Inbound {
        epoch,
        message: event.new_message,
    }) {
        Ok(()) => {}
        Err(TrySendError::Full(inbound)) => {
            tracing::warn!("Inbound queue full; dropping message {}", inbound.message.id);
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!("Message store is gone; ignoring pushed message");
        }
    }
}
