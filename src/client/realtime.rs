//! Realtime Channel
//!
//! The push connection is owned by the session, not by the message store.
//! The store only needs to register and remove listeners on it, so the
//! connection is reached through two small seams:
//!
//! - [`RealtimeChannel`] - `on`/`off` for named events
//! - [`ChannelProvider`] - resolves the channel when needed; it may not be
//!   connected yet. Any `Fn() -> Option<Arc<dyn RealtimeChannel>>` is one.
//!
//! [`LocalChannel`] is an in-process channel with socket.io listener
//! semantics. It backs tests and embedders that feed events themselves.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Listener invoked with each event payload
pub type EventHandler = Arc<dyn Fn(serde_json::Value) + Send + Sync>;

/// A push channel that delivers named JSON events
pub trait RealtimeChannel: Send + Sync {
    /// Register a listener for `event`
    fn on(&self, event: &str, handler: EventHandler);

    /// Remove every listener for `event`
    fn off(&self, event: &str);
}

/// Resolves the session's channel, if it is connected
pub trait ChannelProvider: Send + Sync {
    fn channel(&self) -> Option<Arc<dyn RealtimeChannel>>;
}

impl<F> ChannelProvider for F
where
    F: Fn() -> Option<Arc<dyn RealtimeChannel>> + Send + Sync,
{
    fn channel(&self) -> Option<Arc<dyn RealtimeChannel>> {
        self()
    }
}

/// Provider for a channel resolved up front (or known to be absent)
pub fn fixed_channel(channel: Option<Arc<dyn RealtimeChannel>>) -> impl ChannelProvider {
    move || channel.clone()
}

/// In-process realtime channel
#[derive(Default)]
pub struct LocalChannel {
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl LocalChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `payload` to every listener of `event`.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &str, payload: serde_json::Value) -> usize {
        // Clone the listeners out so a handler may call on/off.
        let handlers: Vec<EventHandler> = {
            let map = self.handlers.read().unwrap_or_else(|p| p.into_inner());
            map.get(event).cloned().unwrap_or_default()
        };

        for handler in &handlers {
            handler(payload.clone());
        }

        tracing::debug!("[Realtime] '{}' delivered to {} listeners", event, handlers.len());
        handlers.len()
    }

    /// Number of listeners registered for `event`
    pub fn listener_count(&self, event: &str) -> usize {
        let map = self.handlers.read().unwrap_or_else(|p| p.into_inner());
        map.get(event).map_or(0, Vec::len)
    }
}

impl RealtimeChannel for LocalChannel {
    fn on(&self, event: &str, handler: EventHandler) {
        let mut map = self.handlers.write().unwrap_or_else(|p| p.into_inner());
        map.entry(event.to_string()).or_default().push(handler);
    }

    fn off(&self, event: &str) {
        let mut map = self.handlers.write().unwrap_or_else(|p| p.into_inner());
        map.remove(event);
    }
}

impl std::fmt::Debug for LocalChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.handlers.read().unwrap_or_else(|p| p.into_inner());
        let counts: HashMap<&str, usize> = map.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        f.debug_struct("LocalChannel").field("listeners", &counts).finish()
    }
}
