//! Feedback submissions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Email, UserId};

/// Validation errors for feedback input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedbackValidationError {
    /// Email or description was blank.
    #[error("Email and description are required")]
    MissingFields,
    /// Email failed the shape check.
    #[error("email must be a valid address")]
    InvalidEmail,
}

/// Append-only feedback record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// Identifier.
    pub id: Uuid,
    /// Contact email given by the submitter.
    pub email: Email,
    /// Free-text feedback.
    pub description: String,
    /// Submitting identity, when the caller presented a valid token.
    pub user_id: Option<UserId>,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Validate a submission and stamp it with `now`.
    pub fn submit(
        email: &str,
        description: &str,
        user_id: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<Self, FeedbackValidationError> {
        let description = description.trim();
        if email.trim().is_empty() || description.is_empty() {
            return Err(FeedbackValidationError::MissingFields);
        }
        let email = Email::new(email).map_err(|_| FeedbackValidationError::InvalidEmail)?;
        Ok(Self {
            id: Uuid::new_v4(),
            email,
            description: description.to_owned(),
            user_id,
            created_at: now,
        })
    }
}
