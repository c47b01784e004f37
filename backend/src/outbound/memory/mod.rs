//! In-process adapters for every repository port.
//!
//! Used when no database is configured and by HTTP and behaviour tests. One
//! [`MemoryStore`] implements all repository ports so joins (event creators)
//! and cascades (identity deletion removes authored events and conversations,
//! and detaches feedback) behave like the PostgreSQL schema. Each aggregate
//! map has its own `tokio::sync::Mutex`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::domain::ports::{
    ConversationRepository, ConversationRepositoryError, EventRepository, EventRepositoryError,
    FeedbackRepository, FeedbackRepositoryError, IdentityRepository, IdentityRepositoryError,
    ResetCodeRepository, ResetCodeRepositoryError, StoredCredentials,
};
use crate::domain::{
    Conversation, ConversationId, CreatorSummary, Email, EventId, EventListing, EventRecord,
    FeedbackRecord, Identity, IdentityFilter, Message, ParticipantPair, ResetCode, ReviewState,
    Role, UserId, VerificationStatus,
};

#[derive(Debug, Clone)]
struct IdentityRow {
    identity: Identity,
    password_hash: String,
}

#[derive(Debug, Default)]
struct ConversationTables {
    by_pair: HashMap<ParticipantPair, Conversation>,
    messages: HashMap<ConversationId, Vec<Message>>,
}

/// Shared in-memory backing store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    identities: Arc<Mutex<HashMap<UserId, IdentityRow>>>,
    events: Arc<Mutex<HashMap<EventId, EventRecord>>>,
    conversations: Arc<Mutex<ConversationTables>>,
    feedback: Arc<Mutex<Vec<FeedbackRecord>>>,
    reset_codes: Arc<Mutex<Vec<ResetCode>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored feedback records.
    pub async fn feedback_count(&self) -> usize {
        self.feedback.lock().await.len()
    }

    /// Number of stored reset codes, expired or not.
    pub async fn reset_code_count(&self) -> usize {
        self.reset_codes.lock().await.len()
    }

    /// Latest reset code issued for `email`.
    pub async fn latest_reset_code(&self, email: &Email) -> Option<String> {
        self.reset_codes
            .lock()
            .await
            .iter()
            .rev()
            .find(|code| &code.email == email)
            .map(|code| code.code.clone())
    }
}

fn newest_first<T>(mut rows: Vec<T>, created_at: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
    rows
}

fn email_taken(
    rows: &HashMap<UserId, IdentityRow>,
    email: &Email,
    except: Option<&UserId>,
) -> bool {
    rows.values()
        .any(|row| row.identity.email() == email && Some(row.identity.id()) != except)
}

#[async_trait]
impl IdentityRepository for MemoryStore {
    async fn insert(
        &self,
        identity: &Identity,
        password_hash: &str,
    ) -> Result<(), IdentityRepositoryError> {
        let mut rows = self.identities.lock().await;
        if email_taken(&rows, identity.email(), None) {
            return Err(IdentityRepositoryError::duplicate_email(
                identity.email().as_ref(),
            ));
        }
        rows.insert(
            *identity.id(),
            IdentityRow {
                identity: identity.clone(),
                password_hash: password_hash.to_owned(),
            },
        );
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Identity>, IdentityRepositoryError> {
        Ok(self
            .identities
            .lock()
            .await
            .get(id)
            .map(|row| row.identity.clone()))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Identity>, IdentityRepositoryError> {
        Ok(self
            .identities
            .lock()
            .await
            .values()
            .find(|row| row.identity.email() == email)
            .map(|row| row.identity.clone()))
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, IdentityRepositoryError> {
        Ok(self
            .identities
            .lock()
            .await
            .values()
            .find(|row| row.identity.email() == email)
            .map(|row| StoredCredentials {
                identity: row.identity.clone(),
                password_hash: row.password_hash.clone(),
            }))
    }

    async fn password_hash(&self, id: &UserId) -> Result<Option<String>, IdentityRepositoryError> {
        Ok(self
            .identities
            .lock()
            .await
            .get(id)
            .map(|row| row.password_hash.clone()))
    }

    async fn save(&self, identity: &Identity) -> Result<(), IdentityRepositoryError> {
        let mut rows = self.identities.lock().await;
        if email_taken(&rows, identity.email(), Some(identity.id())) {
            return Err(IdentityRepositoryError::duplicate_email(
                identity.email().as_ref(),
            ));
        }
        match rows.get_mut(identity.id()) {
            Some(row) => {
                row.identity = identity.clone();
                Ok(())
            }
            None => Err(IdentityRepositoryError::query("record not found")),
        }
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), IdentityRepositoryError> {
        match self.identities.lock().await.get_mut(id) {
            Some(row) => {
                password_hash.clone_into(&mut row.password_hash);
                Ok(())
            }
            None => Err(IdentityRepositoryError::query("record not found")),
        }
    }

    async fn delete(&self, id: &UserId) -> Result<bool, IdentityRepositoryError> {
        let removed = self.identities.lock().await.remove(id).is_some();
        if removed {
            self.events
                .lock()
                .await
                .retain(|_, event| event.created_by() != id);
            let mut conversations = self.conversations.lock().await;
            let ConversationTables { by_pair, messages } = &mut *conversations;
            by_pair.retain(|pair, conversation| {
                let keep = pair.low() != id && pair.high() != id;
                if !keep {
                    messages.remove(&conversation.id);
                }
                keep
            });
            drop(conversations);
            for record in self.feedback.lock().await.iter_mut() {
                if record.user_id.as_ref() == Some(id) {
                    record.user_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn list(&self, filter: IdentityFilter) -> Result<Vec<Identity>, IdentityRepositoryError> {
        let rows: Vec<Identity> = self
            .identities
            .lock()
            .await
            .values()
            .map(|row| row.identity.clone())
            .filter(|identity| filter.matches(identity))
            .collect();
        Ok(newest_first(rows, Identity::created_at))
    }

    async fn list_pending_verifications(&self) -> Result<Vec<Identity>, IdentityRepositoryError> {
        let rows: Vec<Identity> = self
            .identities
            .lock()
            .await
            .values()
            .map(|row| row.identity.clone())
            .filter(|identity| {
                identity.verification_status() == VerificationStatus::Pending
                    && identity
                        .verification()
                        .is_some_and(|record| record.document().is_some())
            })
            .collect();
        Ok(newest_first(rows, Identity::created_at))
    }

    async fn list_by_role_excluding(
        &self,
        role: Role,
        exclude: &UserId,
    ) -> Result<Vec<Identity>, IdentityRepositoryError> {
        let rows: Vec<Identity> = self
            .identities
            .lock()
            .await
            .values()
            .map(|row| row.identity.clone())
            .filter(|identity| identity.role() == role && identity.id() != exclude)
            .collect();
        Ok(newest_first(rows, Identity::created_at))
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn insert(&self, event: &EventRecord) -> Result<(), EventRepositoryError> {
        self.events.lock().await.insert(*event.id(), event.clone());
        Ok(())
    }

    async fn find(&self, id: &EventId) -> Result<Option<EventRecord>, EventRepositoryError> {
        Ok(self.events.lock().await.get(id).cloned())
    }

    async fn save(&self, event: &EventRecord) -> Result<(), EventRepositoryError> {
        match self.events.lock().await.get_mut(event.id()) {
            Some(stored) => {
                *stored = event.clone();
                Ok(())
            }
            None => Err(EventRepositoryError::query("record not found")),
        }
    }

    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError> {
        Ok(self.events.lock().await.remove(id).is_some())
    }

    async fn list_approved(&self) -> Result<Vec<EventRecord>, EventRepositoryError> {
        let rows: Vec<EventRecord> = self
            .events
            .lock()
            .await
            .values()
            .filter(|event| event.moderation().state == ReviewState::Approved)
            .map(|event| event.clone().without_images())
            .collect();
        Ok(newest_first(rows, EventRecord::created_at))
    }

    async fn list_all_with_creators(&self) -> Result<Vec<EventListing>, EventRepositoryError> {
        let events: Vec<EventRecord> = self.events.lock().await.values().cloned().collect();
        let identities = self.identities.lock().await;
        let listings = events
            .into_iter()
            .map(|record| {
                let creator = identities
                    .get(record.created_by())
                    .map(|row| CreatorSummary::from(&row.identity));
                EventListing { record, creator }
            })
            .collect();
        Ok(newest_first(listings, |listing: &EventListing| {
            listing.record.created_at()
        }))
    }

    async fn list_by_creator(
        &self,
        creator: &UserId,
    ) -> Result<Vec<EventRecord>, EventRepositoryError> {
        let rows: Vec<EventRecord> = self
            .events
            .lock()
            .await
            .values()
            .filter(|event| event.created_by() == creator)
            .cloned()
            .collect();
        Ok(newest_first(rows, EventRecord::created_at))
    }
}

#[async_trait]
impl ConversationRepository for MemoryStore {
    async fn find_by_pair(
        &self,
        pair: &ParticipantPair,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        Ok(self.conversations.lock().await.by_pair.get(pair).cloned())
    }

    async fn create(&self, conversation: &Conversation) -> Result<(), ConversationRepositoryError> {
        let mut tables = self.conversations.lock().await;
        if tables.by_pair.contains_key(&conversation.pair) {
            return Err(ConversationRepositoryError::pair_taken());
        }
        tables
            .by_pair
            .insert(conversation.pair, conversation.clone());
        tables.messages.insert(conversation.id, Vec::new());
        Ok(())
    }

    async fn append_message(&self, message: &Message) -> Result<(), ConversationRepositoryError> {
        match self
            .conversations
            .lock()
            .await
            .messages
            .get_mut(&message.conversation_id)
        {
            Some(thread) => {
                thread.push(message.clone());
                Ok(())
            }
            None => Err(ConversationRepositoryError::query("conversation not found")),
        }
    }

    async fn list_messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<Message>, ConversationRepositoryError> {
        Ok(self
            .conversations
            .lock()
            .await
            .messages
            .get(conversation)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl FeedbackRepository for MemoryStore {
    async fn insert(&self, record: &FeedbackRecord) -> Result<(), FeedbackRepositoryError> {
        self.feedback.lock().await.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl ResetCodeRepository for MemoryStore {
    async fn insert(&self, code: &ResetCode) -> Result<(), ResetCodeRepositoryError> {
        self.reset_codes.lock().await.push(code.clone());
        Ok(())
    }

    async fn find_valid(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetCode>, ResetCodeRepositoryError> {
        Ok(self
            .reset_codes
            .lock()
            .await
            .iter()
            .find(|stored| &stored.email == email && stored.code == code && stored.is_valid_at(now))
            .cloned())
    }

    async fn delete_for_email(&self, email: &Email) -> Result<(), ResetCodeRepositoryError> {
        self.reset_codes
            .lock()
            .await
            .retain(|stored| &stored.email != email);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ResetCodeRepositoryError> {
        let mut codes = self.reset_codes.lock().await;
        let before = codes.len();
        codes.retain(|stored| stored.is_valid_at(now));
        Ok(u64::try_from(before - codes.len()).unwrap_or(u64::MAX))
    }
}
