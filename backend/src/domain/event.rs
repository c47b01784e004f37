//! Event listings and their moderation state.
//!
//! An [`EventRecord`] moves through the same [`ReviewState`] machine as age
//! verification. Admin-created records start approved; any later content edit
//! by a vendor sends the record back to `pending` via
//! [`EventRecord::revise_content`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ImageBlob, ReviewState, Role, UserId};

/// Maximum number of images per event.
pub const EVENT_IMAGES_MAX: usize = 3;

/// Validation errors for event content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    /// A required text field was blank.
    #[error("{field} is required")]
    MissingField {
        /// Wire name of the offending field.
        field: &'static str,
    },
    /// Cover charge was negative or not a finite number.
    #[error("coverCharge must be a non-negative number")]
    InvalidCoverCharge,
    /// Too many images were attached.
    #[error("at most {max} images are allowed")]
    TooManyImages {
        /// Maximum accepted image count.
        max: usize,
    },
    /// Identifier was not a UUID.
    #[error("event id must be a valid UUID")]
    InvalidId,
}

/// Stable event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, EventValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| EventValidationError::InvalidId)
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

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Non-negative entry price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CoverCharge(f64);

impl CoverCharge {
    /// Validate a cover charge.
    pub fn new(amount: f64) -> Result<Self, EventValidationError> {
        if amount.is_finite() && amount >= 0.0 {
            Ok(Self(amount))
        } else {
            Err(EventValidationError::InvalidCoverCharge)
        }
    }

    /// Amount as a float.
    #[must_use]
    pub const fn amount(self) -> f64 {
        self.0
    }
}

fn required(field: &'static str, value: &str) -> Result<String, EventValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EventValidationError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}

/// Descriptive event content.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetails {
    /// Event title.
    pub name: String,
    /// Hosting venue.
    pub bar: String,
    /// Street location.
    pub location: String,
    /// Entry price.
    pub cover_charge: CoverCharge,
    /// Free-text description.
    pub description: String,
    /// Map link or coordinates.
    pub map_reference: String,
}

/// Raw descriptive fields as received from a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFields {
    /// Event title.
    pub name: Option<String>,
    /// Hosting venue.
    pub bar: Option<String>,
    /// Street location.
    pub location: Option<String>,
    /// Entry price.
    pub cover_charge: Option<f64>,
    /// Free-text description.
    pub description: Option<String>,
    /// Map link or coordinates.
    pub map_reference: Option<String>,
}

impl EventDetails {
    /// Validate a complete set of fields.
    pub fn try_from_fields(fields: EventFields) -> Result<Self, EventValidationError> {
        let text = |field: &'static str, value: Option<String>| {
            required(field, value.as_deref().unwrap_or_default())
        };
        Ok(Self {
            name: text("eventName", fields.name)?,
            bar: text("bar", fields.bar)?,
            location: text("location", fields.location)?,
            cover_charge: CoverCharge::new(
                fields
                    .cover_charge
                    .ok_or(EventValidationError::MissingField { field: "coverCharge" })?,
            )?,
            description: text("description", fields.description)?,
            map_reference: text("mapReference", fields.map_reference)?,
        })
    }
}

/// Partial content update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    name: Option<String>,
    bar: Option<String>,
    location: Option<String>,
    cover_charge: Option<CoverCharge>,
    description: Option<String>,
    map_reference: Option<String>,
}

impl EventPatch {
    /// Validate the supplied subset of fields.
    pub fn try_from_fields(fields: EventFields) -> Result<Self, EventValidationError> {
        let text = |field: &'static str, value: Option<String>| {
            value.map(|raw| required(field, &raw)).transpose()
        };
        Ok(Self {
            name: text("eventName", fields.name)?,
            bar: text("bar", fields.bar)?,
            location: text("location", fields.location)?,
            cover_charge: fields.cover_charge.map(CoverCharge::new).transpose()?,
            description: text("description", fields.description)?,
            map_reference: text("mapReference", fields.map_reference)?,
        })
    }

    fn apply(self, details: &mut EventDetails) {
        let Self {
            name,
            bar,
            location,
            cover_charge,
            description,
            map_reference,
        } = self;
        if let Some(value) = name {
            details.name = value;
        }
        if let Some(value) = bar {
            details.bar = value;
        }
        if let Some(value) = location {
            details.location = value;
        }
        if let Some(value) = cover_charge {
            details.cover_charge = value;
        }
        if let Some(value) = description {
            details.description = value;
        }
        if let Some(value) = map_reference {
            details.map_reference = value;
        }
    }
}

/// Moderation fields of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moderation {
    /// Current review state.
    pub state: ReviewState,
    /// Admin comment from the last review.
    pub comment: Option<String>,
    /// Time of the last admin review.
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl Moderation {
    /// Initial moderation for a record created by `creator_role`.
    #[must_use]
    pub fn initial(creator_role: Role) -> Self {
        let state = match creator_role {
            Role::Admin => ReviewState::Approved,
            Role::Vendor | Role::User => ReviewState::Pending,
        };
        Self {
            state,
            comment: None,
            reviewed_at: None,
        }
    }
}

/// Stored event with moderation and audit fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    id: EventId,
    details: EventDetails,
    images: Vec<ImageBlob>,
    moderation: Moderation,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parts needed to rebuild an [`EventRecord`] from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecordParts {
    /// Identifier.
    pub id: EventId,
    /// Descriptive content.
    pub details: EventDetails,
    /// Attached images in upload order.
    pub images: Vec<ImageBlob>,
    /// Moderation state.
    pub moderation: Moderation,
    /// Creating identity.
    pub created_by: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl EventRecord {
    /// Create a new record submitted by `creator` with role `creator_role`.
    pub fn create(
        details: EventDetails,
        images: Vec<ImageBlob>,
        creator: UserId,
        creator_role: Role,
        now: DateTime<Utc>,
    ) -> Result<Self, EventValidationError> {
        if images.len() > EVENT_IMAGES_MAX {
            return Err(EventValidationError::TooManyImages {
                max: EVENT_IMAGES_MAX,
            });
        }
        Ok(Self {
            id: EventId::random(),
            details,
            images,
            moderation: Moderation::initial(creator_role),
            created_by: creator,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a record from stored parts.
    #[must_use]
    pub fn from_parts(parts: EventRecordParts) -> Self {
        let EventRecordParts {
            id,
            details,
            images,
            moderation,
            created_by,
            created_at,
            updated_at,
        } = parts;
        Self {
            id,
            details,
            images,
            moderation,
            created_by,
            created_at,
            updated_at,
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    /// Descriptive content.
    #[must_use]
    pub const fn details(&self) -> &EventDetails {
        &self.details
    }

    /// Attached images.
    #[must_use]
    pub fn images(&self) -> &[ImageBlob] {
        &self.images
    }

    /// Drop the image payloads, for listings that never show them.
    #[must_use]
    pub fn without_images(mut self) -> Self {
        self.images.clear();
        self
    }

    /// Moderation state.
    #[must_use]
    pub const fn moderation(&self) -> &Moderation {
        &self.moderation
    }

    /// Creating identity.
    #[must_use]
    pub const fn created_by(&self) -> &UserId {
        &self.created_by
    }

    /// Creation time.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last update time.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether `editor` with `role` may mutate this record.
    #[must_use]
    pub fn may_be_edited_by(&self, editor: &UserId, role: Role) -> bool {
        role == Role::Admin || &self.created_by == editor
    }

    /// Record an admin decision. Always stamps the review time.
    pub fn review(&mut self, state: ReviewState, comment: Option<String>, now: DateTime<Utc>) {
        self.moderation.state = state;
        self.moderation.comment = comment;
        self.moderation.reviewed_at = Some(now);
        self.updated_at = now;
    }

    /// Apply a content edit. Edits by a vendor force re-review.
    pub fn revise_content(&mut self, patch: EventPatch, editor_role: Role, now: DateTime<Utc>) {
        patch.apply(&mut self.details);
        if editor_role == Role::Vendor {
            self.moderation.state = ReviewState::Pending;
        }
        self.updated_at = now;
    }
}
