//! Wire-level frames pushed to WebSocket clients.
//!
//! The socket is push-only: clients receive presence updates and new
//! messages, and send nothing but control frames.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Message, UserId};

/// Message payload carried by a `newMessage` frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for PushedMessage {
    fn from(value: &Message) -> Self {
        Self {
            id: value.id,
            conversation_id: *value.conversation_id.as_uuid(),
            sender_id: *value.sender.as_uuid(),
            receiver_id: *value.receiver.as_uuid(),
            message: value.body.as_ref().to_owned(),
            created_at: value.created_at,
        }
    }
}

/// Frame sent from the server to a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum OutboundFrame {
    /// Identities currently connected.
    OnlineUsers { user_ids: Vec<Uuid> },
    /// A message addressed to this connection's identity.
    NewMessage { message: PushedMessage },
}

impl OutboundFrame {
    /// Presence frame listing `users`.
    pub fn online_users<'a>(users: impl IntoIterator<Item = &'a UserId>) -> Self {
        Self::OnlineUsers {
            user_ids: users.into_iter().map(|id| *id.as_uuid()).collect(),
        }
    }

    /// Push frame for `message`.
    #[must_use]
    pub fn new_message(message: &Message) -> Self {
        Self::NewMessage {
            message: PushedMessage::from(message),
        }
    }
}
