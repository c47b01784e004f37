//! Identity data model.
//!
//! An identity is one account with a role. Role-specific data is carried by
//! the [`RoleProfile`] variant, so an admin or vendor record has no slot for
//! a verification document and a user record has no admin contact details.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::verification::{AgeVerification, VerificationStatus};

/// Validation errors raised by identity value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValidationError {
    /// Identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// Email failed the shape check.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Full name was blank once trimmed.
    #[error("full name must not be empty")]
    EmptyFullName,
    /// Full name exceeded the length limit.
    #[error("full name must be at most {max} characters")]
    FullNameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// Age was outside the accepted range.
    #[error("age must be between {min} and {max}")]
    AgeOutOfRange {
        /// Minimum accepted age.
        min: u8,
        /// Maximum accepted age.
        max: u8,
    },
    /// Role string did not name a known role.
    #[error("role must be one of user, admin, vendor")]
    UnknownRole,
}

/// Stable identity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let raw = id.as_ref();
        if raw.trim() != raw {
            return Err(IdentityValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| IdentityValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Email address, trimmed and lower-cased.
///
/// # Examples
/// ```
/// use nightlist::domain::Email;
///
/// let email = Email::new("  A@X.com ").unwrap();
/// assert_eq!(email.as_ref(), "a@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

/// Maximum accepted email length.
pub const EMAIL_MAX: usize = 254;

impl Email {
    /// Validate and normalise an email address.
    pub fn new(email: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let normalised = email.as_ref().trim().to_lowercase();
        if normalised.chars().count() > EMAIL_MAX || !email_regex().is_match(&normalised) {
            return Err(IdentityValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Human readable account name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

/// Maximum allowed full name length in characters.
pub const FULL_NAME_MAX: usize = 100;

impl FullName {
    /// Validate a full name, trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self, IdentityValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityValidationError::EmptyFullName);
        }
        if trimmed.chars().count() > FULL_NAME_MAX {
            return Err(IdentityValidationError::FullNameTooLong { max: FULL_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FullName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<FullName> for String {
    fn from(value: FullName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FullName {
    type Error = IdentityValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Age in whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Age(u8);

/// Youngest accepted account holder.
pub const AGE_MIN: u8 = 13;
/// Oldest accepted account holder.
pub const AGE_MAX: u8 = 120;

impl Age {
    /// Validate an age in years.
    pub fn new(years: i64) -> Result<Self, IdentityValidationError> {
        u8::try_from(years)
            .ok()
            .filter(|value| (AGE_MIN..=AGE_MAX).contains(value))
            .map(Self)
            .ok_or(IdentityValidationError::AgeOutOfRange {
                min: AGE_MIN,
                max: AGE_MAX,
            })
    }

    /// Years as an integer.
    #[must_use]
    pub const fn years(self) -> u8 {
        self.0
    }
}

impl From<Age> for i64 {
    fn from(value: Age) -> Self {
        Self::from(value.0)
    }
}

impl TryFrom<i64> for Age {
    type Error = IdentityValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Account role. Immutable once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular account subject to age verification.
    User,
    /// Moderator with review rights.
    Admin,
    /// Venue operator who submits events.
    Vendor,
}

impl Role {
    /// Stable wire and storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Vendor => "vendor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = IdentityValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "vendor" => Ok(Self::Vendor),
            _ => Err(IdentityValidationError::UnknownRole),
        }
    }
}

/// Contact details only admins carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminContact {
    /// Contact phone number.
    pub contact_no: Option<String>,
    /// Postal address.
    pub address: Option<String>,
}

/// Role-specific identity data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleProfile {
    /// Regular user with an age-verification record.
    User(AgeVerification),
    /// Administrator with contact details.
    Admin(AdminContact),
    /// Vendor with no role-specific fields.
    Vendor,
}

impl RoleProfile {
    /// Default profile for a freshly created account of `role`.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::User => Self::User(AgeVerification::default()),
            Role::Admin => Self::Admin(AdminContact::default()),
            Role::Vendor => Self::Vendor,
        }
    }

    /// Role this profile belongs to.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::User(_) => Role::User,
            Self::Admin(_) => Role::Admin,
            Self::Vendor => Role::Vendor,
        }
    }
}

/// Identity attributes shared by every role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityDraft {
    /// Identifier to assign.
    pub id: UserId,
    /// Unique login email.
    pub email: Email,
    /// Display name.
    pub full_name: FullName,
    /// Age in years.
    pub age: Age,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Account record without credentials.
///
/// ## Invariants
/// - Verification status is `not_applicable` for every role except `user`;
///   this follows from the [`RoleProfile`] variant and cannot be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: UserId,
    email: Email,
    full_name: FullName,
    age: Age,
    profile: RoleProfile,
    created_at: DateTime<Utc>,
}

impl Identity {
    /// Assemble an identity from shared attributes and a role profile.
    #[must_use]
    pub fn new(draft: IdentityDraft, profile: RoleProfile) -> Self {
        let IdentityDraft {
            id,
            email,
            full_name,
            age,
            created_at,
        } = draft;
        Self {
            id,
            email,
            full_name,
            age,
            profile,
            created_at,
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> &UserId {
        &self.id
    }

    /// Login email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// Display name.
    #[must_use]
    pub const fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Age in years.
    #[must_use]
    pub const fn age(&self) -> Age {
        self.age
    }

    /// Account role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.profile.role()
    }

    /// Role-specific data.
    #[must_use]
    pub const fn profile(&self) -> &RoleProfile {
        &self.profile
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Verification record for users; `None` for other roles.
    #[must_use]
    pub const fn verification(&self) -> Option<&AgeVerification> {
        match &self.profile {
            RoleProfile::User(verification) => Some(verification),
            RoleProfile::Admin(_) | RoleProfile::Vendor => None,
        }
    }

    /// Mutable verification record for users.
    pub fn verification_mut(&mut self) -> Option<&mut AgeVerification> {
        match &mut self.profile {
            RoleProfile::User(verification) => Some(verification),
            RoleProfile::Admin(_) | RoleProfile::Vendor => None,
        }
    }

    /// Effective verification status, `not_applicable` for non-users.
    #[must_use]
    pub fn verification_status(&self) -> VerificationStatus {
        self.verification()
            .map_or(VerificationStatus::NotApplicable, AgeVerification::status)
    }

    /// Admin contact details, for admins only.
    #[must_use]
    pub const fn admin_contact(&self) -> Option<&AdminContact> {
        match &self.profile {
            RoleProfile::Admin(contact) => Some(contact),
            RoleProfile::User(_) | RoleProfile::Vendor => None,
        }
    }

    /// Mutable admin contact details.
    pub fn admin_contact_mut(&mut self) -> Option<&mut AdminContact> {
        match &mut self.profile {
            RoleProfile::Admin(contact) => Some(contact),
            RoleProfile::User(_) | RoleProfile::Vendor => None,
        }
    }

    /// Replace the login email.
    pub fn set_email(&mut self, email: Email) {
        self.email = email;
    }

    /// Replace the display name.
    pub fn set_full_name(&mut self, full_name: FullName) {
        self.full_name = full_name;
    }
}
