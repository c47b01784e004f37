//! PostgreSQL-backed `ConversationRepository` implementation using Diesel ORM.
//!
//! Pairs are stored canonically as `(participant_low, participant_high)` under
//! a unique constraint; losing an insert race surfaces as `PairTaken`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ConversationRepository, ConversationRepositoryError};
use crate::domain::{Conversation, ConversationId, Message, MessageBody, ParticipantPair, UserId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{ConversationRow, MessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::{conversations, messages};

/// Diesel-backed implementation of the `ConversationRepository` port.
#[derive(Clone)]
pub struct DieselConversationRepository {
    pool: DbPool,
}

impl DieselConversationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ConversationRepositoryError {
    map_pool_error(error, |message| ConversationRepositoryError::connection(message))
}

fn diesel_error(error: diesel::result::Error) -> ConversationRepositoryError {
    map_diesel_error(
        error,
        |message| ConversationRepositoryError::query(message),
        |message| ConversationRepositoryError::connection(message),
    )
}

fn row_to_conversation(row: ConversationRow) -> Result<Conversation, ConversationRepositoryError> {
    let pair = ParticipantPair::new(
        UserId::from_uuid(row.participant_low),
        UserId::from_uuid(row.participant_high),
    )
    .map_err(|_| ConversationRepositoryError::query("stored conversation pairs one identity"))?;
    Ok(Conversation {
        id: ConversationId::from_uuid(row.id),
        pair,
        created_at: row.created_at,
    })
}

fn row_to_message(row: MessageRow) -> Result<Message, ConversationRepositoryError> {
    Ok(Message {
        id: row.id,
        conversation_id: ConversationId::from_uuid(row.conversation_id),
        sender: UserId::from_uuid(row.sender_id),
        receiver: UserId::from_uuid(row.receiver_id),
        body: MessageBody::new(&row.body)
            .map_err(|_| ConversationRepositoryError::query("stored message has invalid body"))?,
        created_at: row.created_at,
    })
}

#[async_trait]
impl ConversationRepository for DieselConversationRepository {
    async fn find_by_pair(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ConversationRow> = conversations::table
            .filter(conversations::participant_low.eq(pair.low().as_uuid()))
            .filter(conversations::participant_high.eq(pair.high().as_uuid()))
            .select(ConversationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_conversation).transpose()
    }

    async fn create(&self, conversation: &Conversation) -> Result<(), ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = ConversationRow {
            id: *conversation.id.as_uuid(),
            participant_low: *conversation.pair.low().as_uuid(),
            participant_high: *conversation.pair.high().as_uuid(),
            created_at: conversation.created_at,
        };
        diesel::insert_into(conversations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                if unique_violation(&err) == Some("conversations_pair_key") {
                    ConversationRepositoryError::pair_taken()
                } else {
                    diesel_error(err)
                }
            })
    }

    async fn append_message(&self, message: &Message) -> Result<(), ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = MessageRow {
            id: message.id,
            conversation_id: *message.conversation_id.as_uuid(),
            sender_id: *message.sender.as_uuid(),
            receiver_id: *message.receiver.as_uuid(),
            body: message.body.as_ref().to_owned(),
            created_at: message.created_at,
        };
        diesel::insert_into(messages::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn list_messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, ConversationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<MessageRow> = messages::table
            .filter(messages::conversation_id.eq(conversation.as_uuid()))
            .select(MessageRow::as_select())
            .order(messages::seq.asc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_message).collect()
    }
}
