//! Port for pushing new messages to live receivers.

use crate::domain::Message;

use super::define_port_error;

define_port_error! {
    /// Errors raised by notifier adapters.
    pub enum MessageNotifierError {
        /// The receiver's connection went away before the push.
        Disconnected => "receiver connection closed",
        /// The message could not be encoded.
        Encode { message: String } => "notification encoding failed: {message}",
    }
}

/// Fire-and-forget push. Receivers that are offline are skipped silently.
#[cfg_attr(test, mockall::automock)]
pub trait MessageNotifier: Send + Sync {
    /// Push `message` to its receiver if they are connected.
    fn notify(&self, message: &Message) -> Result<(), MessageNotifierError>;
}

/// Notifier that drops every message, for contexts without live sockets.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpMessageNotifier;

impl MessageNotifier for NoOpMessageNotifier {
    fn notify(&self, _message: &Message) -> Result<(), MessageNotifierError> {
        Ok(())
    }
}
