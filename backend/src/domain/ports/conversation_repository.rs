//! Port for conversations and their append-only message threads.

use async_trait::async_trait;

use crate::domain::{Conversation, ConversationId, Message, ParticipantPair};

use super::define_port_error;

define_port_error! {
    /// Errors raised by conversation repository adapters.
    pub enum ConversationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "conversation repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "conversation repository query failed: {message}",
        /// A conversation for the pair already exists.
        PairTaken => "conversation already exists for the pair",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find the conversation for an unordered pair.
    async fn find_by_pair(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, ConversationRepositoryError>;

    /// Create a conversation. Fails with `PairTaken` when one already exists.
    async fn create(&self, conversation: &Conversation) -> Result<(), ConversationRepositoryError>;

    /// Append a message to its conversation.
    async fn append_message(&self, message: &Message) -> Result<(), ConversationRepositoryError>;

    /// Messages of a conversation in append order.
    async fn list_messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, ConversationRepositoryError>;
}
