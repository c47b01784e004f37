//! Read models returned by domain services.

use chrono::{DateTime, Utc};

use crate::domain::{
    Email, EventRecord, FullName, Identity, Role, UserId, VerificationStatus,
};

/// Filters for admin identity listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityFilter {
    /// Restrict to one role.
    pub role: Option<Role>,
    /// Restrict to one effective verification status.
    pub status: Option<VerificationStatus>,
}

impl IdentityFilter {
    /// Whether `identity` passes the filter.
    #[must_use]
    pub fn matches(&self, identity: &Identity) -> bool {
        self.role.is_none_or(|role| identity.role() == role)
            && self
                .status
                .is_none_or(|status| identity.verification_status() == status)
    }
}

/// Compact identity projection used in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySummary {
    /// Identifier.
    pub id: UserId,
    /// Display name.
    pub full_name: FullName,
    /// Login email.
    pub email: Email,
    /// Account role.
    pub role: Role,
    /// Effective verification status.
    pub verification_status: VerificationStatus,
}

impl From<&Identity> for IdentitySummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: *identity.id(),
            full_name: identity.full_name().clone(),
            email: identity.email().clone(),
            role: identity.role(),
            verification_status: identity.verification_status(),
        }
    }
}

/// Creator projection attached to admin event listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorSummary {
    /// Identifier.
    pub id: UserId,
    /// Display name.
    pub full_name: FullName,
    /// Login email.
    pub email: Email,
    /// Account role.
    pub role: Role,
}

impl From<&Identity> for CreatorSummary {
    fn from(identity: &Identity) -> Self {
        Self {
            id: *identity.id(),
            full_name: identity.full_name().clone(),
            email: identity.email().clone(),
            role: identity.role(),
        }
    }
}

/// Event joined with its creator, when the creator still exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EventListing {
    /// Stored record.
    pub record: EventRecord,
    /// Creating identity.
    pub creator: Option<CreatorSummary>,
}

/// Caller-facing verification status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationView {
    /// Effective status.
    pub status: VerificationStatus,
    /// Reviewer comment.
    pub comment: Option<String>,
    /// Time of the latest submission.
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<&Identity> for VerificationView {
    fn from(identity: &Identity) -> Self {
        identity.verification().map_or(
            Self {
                status: VerificationStatus::NotApplicable,
                comment: None,
                submitted_at: None,
            },
            |record| Self {
                status: record.status(),
                comment: record.comment().map(ToOwned::to_owned),
                submitted_at: record.submitted_at(),
            },
        )
    }
}
