//! User-facing error notifications.

/// Shows a transient error to the user
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

/// Notifier for headless use: writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::error!(target: "chat_sync::notify", "{}", message);
    }
}
