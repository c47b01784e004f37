//! Direct messages between two identities.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::UserId;

/// Maximum message length in characters.
pub const MESSAGE_MAX: usize = 2000;

/// Validation errors for messaging input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessagingValidationError {
    /// Body was blank once trimmed.
    #[error("message must not be empty")]
    EmptyBody,
    /// Body exceeded [`MESSAGE_MAX`].
    #[error("message must be at most {max} characters")]
    BodyTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Sender and receiver are the same identity.
    #[error("cannot send a message to yourself")]
    SelfConversation,
}

/// Trimmed message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageBody(String);

impl MessageBody {
    /// Validate message text.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, MessagingValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MessagingValidationError::EmptyBody);
        }
        if trimmed.chars().count() > MESSAGE_MAX {
            return Err(MessagingValidationError::BodyTooLong { max: MESSAGE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MessageBody {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unordered pair of distinct identities, stored as `(low, high)`.
///
/// # Examples
/// ```
/// use nightlist::domain::{ParticipantPair, UserId};
///
/// let a = UserId::random();
/// let b = UserId::random();
/// assert_eq!(ParticipantPair::new(a, b), ParticipantPair::new(b, a));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticipantPair {
    low: UserId,
    high: UserId,
}

impl ParticipantPair {
    /// Canonicalise two identities into a pair.
    pub fn new(a: UserId, b: UserId) -> Result<Self, MessagingValidationError> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Ok(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Ok(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => Err(MessagingValidationError::SelfConversation),
        }
    }

    /// Lower identifier.
    #[must_use]
    pub const fn low(&self) -> &UserId {
        &self.low
    }

    /// Higher identifier.
    #[must_use]
    pub const fn high(&self) -> &UserId {
        &self.high
    }
}

/// Conversation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConversationId(Uuid);

impl ConversationId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

/// Conversation header. Messages are read separately in append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    /// Identifier.
    pub id: ConversationId,
    /// Participants.
    pub pair: ParticipantPair,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// One immutable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Identifier.
    pub id: Uuid,
    /// Owning conversation.
    pub conversation_id: ConversationId,
    /// Author.
    pub sender: UserId,
    /// Recipient.
    pub receiver: UserId,
    /// Text.
    pub body: MessageBody,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
