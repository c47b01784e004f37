//! Port for event persistence and moderation listings.

use async_trait::async_trait;

use crate::domain::{EventId, EventListing, EventRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "event repository query failed: {message}",
    }
}

/// Port for writing events and reading moderation listings.
///
/// Listings are ordered newest first by creation time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persist a new event with its images.
    async fn insert(&self, event: &EventRecord) -> Result<(), EventRepositoryError>;

    /// Find an event by id.
    async fn find(&self, id: &EventId) -> Result<Option<EventRecord>, EventRepositoryError>;

    /// Persist content and moderation changes. Images are untouched.
    async fn save(&self, event: &EventRecord) -> Result<(), EventRepositoryError>;

    /// Delete an event and release its images. Returns whether it existed.
    async fn delete(&self, id: &EventId) -> Result<bool, EventRepositoryError>;

    /// Approved events only, without their images.
    async fn list_approved(&self) -> Result<Vec<EventRecord>, EventRepositoryError>;

    /// Every event joined with its creator.
    async fn list_all_with_creators(&self) -> Result<Vec<EventListing>, EventRepositoryError>;

    /// Events created by `creator`.
    async fn list_by_creator(
        &self,
        creator: &UserId,
    ) -> Result<Vec<EventRecord>, EventRepositoryError>;
}
