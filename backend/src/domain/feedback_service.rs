//! Feedback intake.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::error_mapping::{map_feedback_error, map_identity_error};
use crate::domain::ports::{FeedbackRepository, IdentityRepository};
use crate::domain::{Error, FeedbackRecord, UserId};

/// Accepts feedback from anonymous or authenticated callers.
#[derive(Clone)]
pub struct FeedbackService {
    feedback: Arc<dyn FeedbackRepository>,
    identities: Arc<dyn IdentityRepository>,
    clock: Arc<dyn Clock>,
}

impl FeedbackService {
    /// Create the service over the feedback sink.
    pub fn new(
        feedback: Arc<dyn FeedbackRepository>,
        identities: Arc<dyn IdentityRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            feedback,
            identities,
            clock,
        }
    }

    /// Keep `submitter` only while the account it names still exists.
    async fn resolve(&self, submitter: Option<UserId>) -> Result<Option<UserId>, Error> {
        let Some(id) = submitter else {
            return Ok(None);
        };
        let found = self
            .identities
            .find_by_id(&id)
            .await
            .map_err(map_identity_error)?;
        Ok(found.map(|identity| *identity.id()))
    }

    /// Validate and store a submission, attributed when `submitter` is known.
    ///
    /// A submitter whose account is gone is stored as anonymous.
    pub async fn submit(
        &self,
        email: &str,
        description: &str,
        submitter: Option<UserId>,
    ) -> Result<FeedbackRecord, Error> {
        let submitter = self.resolve(submitter).await?;
        let record = FeedbackRecord::submit(email, description, submitter, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.feedback
            .insert(&record)
            .await
            .map_err(map_feedback_error)?;
        info!(feedback_id = %record.id, attributed = record.user_id.is_some(), "feedback received");
        Ok(record)
    }
}
