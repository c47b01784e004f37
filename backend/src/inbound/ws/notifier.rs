//! [`MessageNotifier`] backed by the presence registry.

use std::sync::Arc;

use tracing::debug;

use crate::domain::Message;
use crate::domain::ports::{MessageNotifier, MessageNotifierError};
use crate::inbound::ws::messages::OutboundFrame;
use crate::inbound::ws::presence::PresenceRegistry;

/// Pushes `newMessage` frames to receivers that are online.
#[derive(Debug, Clone)]
pub struct WsMessageNotifier {
    presence: Arc<PresenceRegistry>,
}

impl WsMessageNotifier {
    /// Create a notifier over `presence`.
    #[must_use]
    pub fn new(presence: Arc<PresenceRegistry>) -> Self {
        Self { presence }
    }
}

impl MessageNotifier for WsMessageNotifier {
    fn notify(&self, message: &Message) -> Result<(), MessageNotifierError> {
        let Some(handle) = self.presence.lookup(&message.receiver) else {
            debug!(receiver = %message.receiver, "receiver offline; push skipped");
            return Ok(());
        };
        handle
            .send(OutboundFrame::new_message(message))
            .map_err(|_| MessageNotifierError::disconnected())
    }
}
