//! Event moderation workflow.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::error_mapping::map_event_error;
use crate::domain::ports::EventRepository;
use crate::domain::{
    Error, EventDetails, EventId, EventListing, EventPatch, EventRecord, Identity, ImageBlob,
    ReviewState, RoleRequirement, authorize,
};

/// Drives [`EventRecord`] creation, review and edits.
#[derive(Clone)]
pub struct ModerationService {
    events: Arc<dyn EventRepository>,
    clock: Arc<dyn Clock>,
}

impl ModerationService {
    /// Create the service over the event store.
    pub fn new(events: Arc<dyn EventRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { events, clock }
    }

    async fn load(&self, id: &EventId) -> Result<EventRecord, Error> {
        self.events
            .find(id)
            .await
            .map_err(map_event_error)?
            .ok_or_else(|| Error::not_found("Event not found"))
    }

    /// Submit a new event. Admin submissions are approved immediately.
    pub async fn create(
        &self,
        caller: &Identity,
        details: EventDetails,
        images: Vec<ImageBlob>,
    ) -> Result<EventRecord, Error> {
        authorize(caller, RoleRequirement::AdminOrVendor)?;
        let event = EventRecord::create(
            details,
            images,
            *caller.id(),
            caller.role(),
            self.clock.utc(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.events.insert(&event).await.map_err(map_event_error)?;
        info!(
            event_id = %event.id(),
            creator = %caller.id(),
            status = %event.moderation().state,
            "event created"
        );
        Ok(event)
    }

    /// Approved events for any authenticated caller.
    pub async fn list_public(&self) -> Result<Vec<EventRecord>, Error> {
        self.events.list_approved().await.map_err(map_event_error)
    }

    /// Every event with its creator, for admins.
    pub async fn list_all(&self, caller: &Identity) -> Result<Vec<EventListing>, Error> {
        authorize(caller, RoleRequirement::Admin)?;
        self.events
            .list_all_with_creators()
            .await
            .map_err(map_event_error)
    }

    /// Events the calling vendor created.
    pub async fn list_own(&self, caller: &Identity) -> Result<Vec<EventRecord>, Error> {
        authorize(caller, RoleRequirement::Vendor)?;
        self.events
            .list_by_creator(caller.id())
            .await
            .map_err(map_event_error)
    }

    /// Set an event's moderation state. Always stamps the review time.
    pub async fn update_status(
        &self,
        caller: &Identity,
        id: &EventId,
        status: &str,
        comment: Option<String>,
    ) -> Result<EventRecord, Error> {
        authorize(caller, RoleRequirement::Admin)?;
        let state = status
            .parse::<ReviewState>()
            .map_err(|_| Error::invalid_request("Invalid status"))?;
        let mut event = self.load(id).await?;
        event.review(state, comment, self.clock.utc());
        self.events.save(&event).await.map_err(map_event_error)?;
        info!(event_id = %id, status = %state, reviewer = %caller.id(), "event reviewed");
        Ok(event)
    }

    /// Apply a content edit from the creator or an admin.
    pub async fn edit(
        &self,
        caller: &Identity,
        id: &EventId,
        patch: EventPatch,
    ) -> Result<EventRecord, Error> {
        let mut event = self.load(id).await?;
        if !event.may_be_edited_by(caller.id(), caller.role()) {
            return Err(Error::forbidden("Not authorized to update this event"));
        }
        event.revise_content(patch, caller.role(), self.clock.utc());
        self.events.save(&event).await.map_err(map_event_error)?;
        Ok(event)
    }

    /// Hard-delete an event.
    pub async fn delete(&self, caller: &Identity, id: &EventId) -> Result<(), Error> {
        authorize(caller, RoleRequirement::Admin)?;
        let removed = self.events.delete(id).await.map_err(map_event_error)?;
        if !removed {
            return Err(Error::not_found("Event not found"));
        }
        info!(event_id = %id, "event deleted");
        Ok(())
    }
}
