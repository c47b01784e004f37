//! Direct messaging between identities.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::error_mapping::{map_conversation_error, map_identity_error};
use crate::domain::ports::{
    ConversationRepository, ConversationRepositoryError, IdentityRepository, MessageNotifier,
};
use crate::domain::{
    Conversation, ConversationId, Error, Identity, Message, MessageBody, ParticipantPair, Role,
    UserId,
};

/// Pairs identities into conversations and appends messages.
#[derive(Clone)]
pub struct MessagingService {
    identities: Arc<dyn IdentityRepository>,
    conversations: Arc<dyn ConversationRepository>,
    notifier: Arc<dyn MessageNotifier>,
    clock: Arc<dyn Clock>,
}

fn pair_for(caller: &Identity, other: &UserId) -> Result<ParticipantPair, Error> {
    ParticipantPair::new(*caller.id(), *other)
        .map_err(|_| Error::invalid_request("Cannot message yourself"))
}

impl MessagingService {
    /// Create the service.
    pub fn new(
        identities: Arc<dyn IdentityRepository>,
        conversations: Arc<dyn ConversationRepository>,
        notifier: Arc<dyn MessageNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            conversations,
            notifier,
            clock,
        }
    }

    async fn conversation_for(&self, pair: &ParticipantPair) -> Result<Conversation, Error> {
        if let Some(existing) = self
            .conversations
            .find_by_pair(pair)
            .await
            .map_err(map_conversation_error)?
        {
            return Ok(existing);
        }

        let fresh = Conversation {
            id: ConversationId::random(),
            pair: *pair,
            created_at: self.clock.utc(),
        };
        match self.conversations.create(&fresh).await {
            Ok(()) => Ok(fresh),
            Err(ConversationRepositoryError::PairTaken) => {
                debug!("conversation create lost the race; re-reading");
                self.conversations
                    .find_by_pair(pair)
                    .await
                    .map_err(map_conversation_error)?
                    .ok_or_else(|| Error::internal("conversation vanished after conflict"))
            }
            Err(other) => Err(map_conversation_error(other)),
        }
    }

    /// Append a message from `sender` to `receiver`.
    ///
    /// The receiver is notified afterwards; a failed push is logged and
    /// otherwise ignored.
    pub async fn send(
        &self,
        sender: &Identity,
        receiver: &UserId,
        body: MessageBody,
    ) -> Result<Message, Error> {
        let pair = pair_for(sender, receiver)?;
        self.identities
            .find_by_id(receiver)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found("Receiver not found"))?;

        let conversation = self.conversation_for(&pair).await?;
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id: conversation.id,
            sender: *sender.id(),
            receiver: *receiver,
            body,
            created_at: self.clock.utc(),
        };
        self.conversations
            .append_message(&message)
            .await
            .map_err(map_conversation_error)?;

        if let Err(error) = self.notifier.notify(&message) {
            warn!(%error, receiver = %receiver, "message push failed");
        }
        Ok(message)
    }

    /// Messages between the caller and `counterparty` in append order.
    pub async fn thread(
        &self,
        caller: &Identity,
        counterparty: &UserId,
    ) -> Result<Vec<Message>, Error> {
        let pair = pair_for(caller, counterparty)?;
        let conversation = self
            .conversations
            .find_by_pair(&pair)
            .await
            .map_err(map_conversation_error)?
            .ok_or_else(|| Error::not_found("Conversation not found"))?;
        self.conversations
            .list_messages(&conversation.id)
            .await
            .map_err(map_conversation_error)
    }

    /// Users the caller can start a conversation with.
    pub async fn contacts(&self, caller: &Identity) -> Result<Vec<Identity>, Error> {
        self.identities
            .list_by_role_excluding(Role::User, caller.id())
            .await
            .map_err(map_identity_error)
    }
}
