//! Age-verification state machine.
//!
//! Only `user` identities carry an [`AgeVerification`]. Their stored state is
//! one of [`ReviewState`]; the wider [`VerificationStatus`] adds
//! `not_applicable` for every other role and is never persisted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ImageBlob;

/// Review state shared by verification documents and events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Awaiting an admin decision.
    #[default]
    Pending,
    /// Accepted by an admin.
    Approved,
    /// Declined by an admin.
    Rejected,
}

impl ReviewState {
    /// Stable wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown review state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown review state: {0}")]
pub struct UnknownReviewState(pub String);

impl FromStr for ReviewState {
    type Err = UnknownReviewState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(UnknownReviewState(other.to_owned())),
        }
    }
}

/// Effective verification status reported for any identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Awaiting review.
    Pending,
    /// Approved by an admin.
    Approved,
    /// Rejected by an admin.
    Rejected,
    /// Role does not take part in verification.
    NotApplicable,
}

impl VerificationStatus {
    /// Stable wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::NotApplicable => "not_applicable",
        }
    }
}

impl From<ReviewState> for VerificationStatus {
    fn from(value: ReviewState) -> Self {
        match value {
            ReviewState::Pending => Self::Pending,
            ReviewState::Approved => Self::Approved,
            ReviewState::Rejected => Self::Rejected,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationStatus {
    type Err = UnknownReviewState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "not_applicable" {
            return Ok(Self::NotApplicable);
        }
        s.parse::<ReviewState>().map(Self::from)
    }
}

/// Admin decision on a pending item. `pending` is not a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Accept the item.
    Approve,
    /// Decline the item.
    Reject,
}

impl ReviewDecision {
    /// Parse a decision from its wire form (`approved` or `rejected`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "approved" => Some(Self::Approve),
            "rejected" => Some(Self::Reject),
            _ => None,
        }
    }
}

impl From<ReviewDecision> for ReviewState {
    fn from(value: ReviewDecision) -> Self {
        match value {
            ReviewDecision::Approve => Self::Approved,
            ReviewDecision::Reject => Self::Rejected,
        }
    }
}

/// Raised when a document submission is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    /// The record is already approved and cannot be resubmitted.
    #[error("verification already approved")]
    AlreadyApproved,
}

/// Verification record embedded in a `user` identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgeVerification {
    document: Option<ImageBlob>,
    state: ReviewState,
    comment: Option<String>,
    submitted_at: Option<DateTime<Utc>>,
}

impl AgeVerification {
    /// Rebuild a record from stored parts.
    #[must_use]
    pub fn from_parts(
        document: Option<ImageBlob>,
        state: ReviewState,
        comment: Option<String>,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            document,
            state,
            comment,
            submitted_at,
        }
    }

    /// Submitted document, if any.
    #[must_use]
    pub fn document(&self) -> Option<&ImageBlob> {
        self.document.as_ref()
    }

    /// Stored review state.
    #[must_use]
    pub fn state(&self) -> ReviewState {
        self.state
    }

    /// Effective status.
    #[must_use]
    pub fn status(&self) -> VerificationStatus {
        self.state.into()
    }

    /// Reviewer comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Time of the latest submission.
    #[must_use]
    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    /// Whether a new document may replace the current one.
    pub fn accepts_submission(&self) -> Result<(), SubmissionError> {
        if self.state == ReviewState::Approved {
            Err(SubmissionError::AlreadyApproved)
        } else {
            Ok(())
        }
    }

    /// Store a new document and return the record to `pending`.
    ///
    /// Leaves the record untouched when it is already approved.
    pub fn submit(
        &mut self,
        document: ImageBlob,
        now: DateTime<Utc>,
    ) -> Result<(), SubmissionError> {
        self.accepts_submission()?;
        self.document = Some(document);
        self.state = ReviewState::Pending;
        self.comment = None;
        self.submitted_at = Some(now);
        Ok(())
    }

    /// Apply an admin decision. Blank comments are stored as `None`.
    pub fn review(&mut self, decision: ReviewDecision, comment: Option<String>) {
        self.state = decision.into();
        self.comment = comment.filter(|text| !text.trim().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn document() -> ImageBlob {
        ImageBlob::from_stored("image/png".to_owned(), vec![1, 2, 3])
    }

    #[rstest]
    #[case(ReviewState::Pending)]
    #[case(ReviewState::Rejected)]
    fn submission_resets_to_pending_and_clears_comment(
        document: ImageBlob,
        #[case] prior: ReviewState,
    ) {
        let mut record =
            AgeVerification::from_parts(None, prior, Some("blurry".to_owned()), None);
        let now = Utc::now();

        record.submit(document.clone(), now).expect("submission allowed");

        assert_eq!(record.state(), ReviewState::Pending);
        assert_eq!(record.comment(), None);
        assert_eq!(record.submitted_at(), Some(now));
        assert_eq!(record.document(), Some(&document));
    }

    #[rstest]
    fn approved_records_reject_submission_without_mutation(document: ImageBlob) {
        let original =
            AgeVerification::from_parts(None, ReviewState::Approved, Some("ok".to_owned()), None);
        let mut record = original.clone();
        assert_eq!(
            record.accepts_submission(),
            Err(SubmissionError::AlreadyApproved)
        );

        let result = record.submit(document, Utc::now());

        assert_eq!(result, Err(SubmissionError::AlreadyApproved));
        assert_eq!(record, original);
    }

    #[rstest]
    #[case("approved", Some(ReviewDecision::Approve))]
    #[case("rejected", Some(ReviewDecision::Reject))]
    #[case("pending", None)]
    #[case("APPROVED", None)]
    fn decisions_parse_from_wire(#[case] raw: &str, #[case] expected: Option<ReviewDecision>) {
        assert_eq!(ReviewDecision::parse(raw), expected);
    }

    #[rstest]
    #[case(Some("  ".to_owned()), None)]
    #[case(Some("looks fine".to_owned()), Some("looks fine"))]
    #[case(None, None)]
    fn review_stores_non_blank_comments(
        #[case] comment: Option<String>,
        #[case] expected: Option<&str>,
    ) {
        let mut record = AgeVerification::default();
        record.review(ReviewDecision::Approve, comment);
        assert_eq!(record.status(), VerificationStatus::Approved);
        assert_eq!(record.comment(), expected);
    }

    #[rstest]
    fn status_parses_not_applicable() {
        assert_eq!(
            "not_applicable".parse::<VerificationStatus>(),
            Ok(VerificationStatus::NotApplicable)
        );
        assert!("unknown".parse::<VerificationStatus>().is_err());
    }
}
