//! Age-verification workflow: submission by users, review by admins.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::error_mapping::map_identity_error;
use crate::domain::ports::IdentityRepository;
use crate::domain::{
    Error, Identity, IdentityFilter, ImageBlob, ReviewDecision, RoleRequirement,
    SubmissionError, UserId, VerificationView, authorize,
};

fn not_a_user() -> Error {
    Error::forbidden("Only users can submit age verification")
}

fn submission_error(err: SubmissionError) -> Error {
    match err {
        SubmissionError::AlreadyApproved => Error::conflict("Age verification already approved"),
    }
}

/// Drives [`crate::domain::AgeVerification`] transitions.
#[derive(Clone)]
pub struct VerificationService {
    identities: Arc<dyn IdentityRepository>,
    clock: Arc<dyn Clock>,
}

impl VerificationService {
    /// Create the service over the identity store.
    pub fn new(identities: Arc<dyn IdentityRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { identities, clock }
    }

    async fn load(&self, id: &UserId) -> Result<Identity, Error> {
        self.identities
            .find_by_id(id)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Reject callers whose account cannot take a new document.
    ///
    /// Adapters call this before reading an upload body.
    pub fn admit_submission(caller: &Identity) -> Result<(), Error> {
        caller
            .verification()
            .ok_or_else(not_a_user)?
            .accepts_submission()
            .map_err(submission_error)
    }

    /// Store a new document for the caller and return to `pending`.
    pub async fn submit(
        &self,
        caller: &Identity,
        document: ImageBlob,
    ) -> Result<VerificationView, Error> {
        let mut identity = self.load(caller.id()).await?;
        let now = self.clock.utc();
        let record = identity.verification_mut().ok_or_else(not_a_user)?;
        record.submit(document, now).map_err(submission_error)?;
        self.identities
            .save(&identity)
            .await
            .map_err(map_identity_error)?;
        info!(user_id = %identity.id(), "age verification submitted");
        Ok(VerificationView::from(&identity))
    }

    /// Current verification status of the caller.
    pub async fn status(&self, caller: &Identity) -> Result<VerificationView, Error> {
        let identity = self.load(caller.id()).await?;
        Ok(VerificationView::from(&identity))
    }

    /// Approve or reject a user's verification.
    ///
    /// `decision` is the wire value (`approved` or `rejected`). No review
    /// timestamp is recorded.
    pub async fn review(
        &self,
        caller: &Identity,
        target: &UserId,
        decision: &str,
        comment: Option<String>,
    ) -> Result<Identity, Error> {
        authorize(caller, RoleRequirement::Admin)?;
        let decision = ReviewDecision::parse(decision)
            .ok_or_else(|| Error::invalid_request("Invalid status. Must be approved or rejected"))?;
        let mut identity = self.load(target).await?;
        let record = identity.verification_mut().ok_or_else(|| {
            Error::invalid_request("User does not take part in age verification")
        })?;
        record.review(decision, comment);
        self.identities
            .save(&identity)
            .await
            .map_err(map_identity_error)?;
        info!(
            target = %identity.id(),
            status = %identity.verification_status(),
            reviewer = %caller.id(),
            "age verification reviewed"
        );
        Ok(identity)
    }

    /// Users awaiting review with a submitted document.
    pub async fn list_pending(&self, caller: &Identity) -> Result<Vec<Identity>, Error> {
        authorize(caller, RoleRequirement::Admin)?;
        self.identities
            .list_pending_verifications()
            .await
            .map_err(map_identity_error)
    }

    /// Every identity matching `filter`.
    pub async fn list_identities(
        &self,
        caller: &Identity,
        filter: IdentityFilter,
    ) -> Result<Vec<Identity>, Error> {
        authorize(caller, RoleRequirement::Admin)?;
        self.identities
            .list(filter)
            .await
            .map_err(map_identity_error)
    }

    /// One identity with its verification document.
    pub async fn detail(&self, caller: &Identity, target: &UserId) -> Result<Identity, Error> {
        authorize(caller, RoleRequirement::Admin)?;
        self.load(target).await
    }
}
