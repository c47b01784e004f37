//! JSON projections of domain records.
//!
//! All views are camelCase. Binary blobs are base64 (standard alphabet) with
//! their content type alongside.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    CreatorSummary, EventListing, EventRecord, Identity, IdentitySummary, ImageBlob, Message,
    VerificationView,
};

/// Encoded image or document.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlobView {
    /// MIME type declared at upload.
    #[schema(example = "image/jpeg")]
    pub content_type: String,
    /// Base64-encoded bytes.
    pub data: String,
}

impl From<&ImageBlob> for BlobView {
    fn from(blob: &ImageBlob) -> Self {
        Self {
            content_type: blob.content_type().to_owned(),
            data: STANDARD.encode(blob.data()),
        }
    }
}

/// Identity listing row.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySummaryView {
    pub id: Uuid,
    #[schema(example = "Ada Lovelace")]
    pub full_name: String,
    pub email: String,
    #[schema(example = "user")]
    pub role: String,
    #[schema(example = "pending")]
    pub verification_status: String,
}

impl From<&Identity> for IdentitySummaryView {
    fn from(identity: &Identity) -> Self {
        let summary = IdentitySummary::from(identity);
        Self {
            id: *summary.id.as_uuid(),
            full_name: summary.full_name.to_string(),
            email: summary.email.to_string(),
            role: summary.role.as_str().to_owned(),
            verification_status: summary.verification_status.as_str().to_owned(),
        }
    }
}

/// Contact candidate for messaging.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

impl From<&Identity> for ContactView {
    fn from(identity: &Identity) -> Self {
        Self {
            id: *identity.id().as_uuid(),
            full_name: identity.full_name().to_string(),
            email: identity.email().to_string(),
        }
    }
}

/// Verification state of one user.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationStatusView {
    #[schema(example = "pending")]
    pub status: String,
    pub comment: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<VerificationView> for VerificationStatusView {
    fn from(view: VerificationView) -> Self {
        Self {
            status: view.status.as_str().to_owned(),
            comment: view.comment,
            submitted_at: view.submitted_at,
        }
    }
}

/// Caller's own profile. Never includes secrets or document bytes.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub age: u8,
    pub role: String,
    pub created_at: DateTime<Utc>,
    /// Present for `user` accounts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationStatusView>,
    /// Present for `admin` accounts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_no: Option<String>,
    /// Present for `admin` accounts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&Identity> for ProfileView {
    fn from(identity: &Identity) -> Self {
        let contact = identity.admin_contact();
        Self {
            id: *identity.id().as_uuid(),
            full_name: identity.full_name().to_string(),
            email: identity.email().to_string(),
            age: identity.age().years(),
            role: identity.role().as_str().to_owned(),
            created_at: identity.created_at(),
            verification: identity
                .verification()
                .map(|_| VerificationView::from(identity).into()),
            contact_no: contact.and_then(|c| c.contact_no.clone()),
            address: contact.and_then(|c| c.address.clone()),
        }
    }
}

/// Admin view of one user's verification, including the document.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationDetailView {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub age: u8,
    pub role: String,
    pub document: Option<BlobView>,
    pub status: String,
    pub comment: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Identity> for VerificationDetailView {
    fn from(identity: &Identity) -> Self {
        let view = VerificationView::from(identity);
        Self {
            id: *identity.id().as_uuid(),
            full_name: identity.full_name().to_string(),
            email: identity.email().to_string(),
            age: identity.age().years(),
            role: identity.role().as_str().to_owned(),
            document: identity
                .verification()
                .and_then(|record| record.document())
                .map(BlobView::from),
            status: view.status.as_str().to_owned(),
            comment: view.comment,
            submitted_at: view.submitted_at,
            created_at: identity.created_at(),
        }
    }
}

/// Approved event as shown to every authenticated caller.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicEventView {
    pub id: Uuid,
    #[schema(example = "Open mic")]
    pub event_name: String,
    pub bar: String,
    pub location: String,
    #[schema(example = 5.0)]
    pub cover_charge: f64,
    pub description: String,
    pub map_reference: String,
}

impl From<&EventRecord> for PublicEventView {
    fn from(record: &EventRecord) -> Self {
        let details = record.details();
        Self {
            id: *record.id().as_uuid(),
            event_name: details.name.clone(),
            bar: details.bar.clone(),
            location: details.location.clone(),
            cover_charge: details.cover_charge.amount(),
            description: details.description.clone(),
            map_reference: details.map_reference.clone(),
        }
    }
}

/// Full event record for creators and admins.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub content: PublicEventView,
    pub images: Vec<BlobView>,
    #[schema(example = "pending")]
    pub status: String,
    pub status_comment: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&EventRecord> for EventView {
    fn from(record: &EventRecord) -> Self {
        let moderation = record.moderation();
        Self {
            content: PublicEventView::from(record),
            images: record.images().iter().map(BlobView::from).collect(),
            status: moderation.state.as_str().to_owned(),
            status_comment: moderation.comment.clone(),
            reviewed_at: moderation.reviewed_at,
            created_by: *record.created_by().as_uuid(),
            created_at: record.created_at(),
            updated_at: record.updated_at(),
        }
    }
}

/// Creator projection on admin listings.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatorView {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

impl From<&CreatorSummary> for CreatorView {
    fn from(creator: &CreatorSummary) -> Self {
        Self {
            id: *creator.id.as_uuid(),
            full_name: creator.full_name.to_string(),
            email: creator.email.to_string(),
            role: creator.role.as_str().to_owned(),
        }
    }
}

/// Admin listing row: the record plus its creator.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminEventView {
    #[serde(flatten)]
    pub event: EventView,
    pub creator: Option<CreatorView>,
}

impl From<&EventListing> for AdminEventView {
    fn from(listing: &EventListing) -> Self {
        Self {
            event: EventView::from(&listing.record),
            creator: listing.creator.as_ref().map(CreatorView::from),
        }
    }
}

/// One direct message.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            conversation_id: *message.conversation_id.as_uuid(),
            sender_id: *message.sender.as_uuid(),
            receiver_id: *message.receiver.as_uuid(),
            message: message.body.as_ref().to_owned(),
            created_at: message.created_at,
        }
    }
}

/// Acknowledgement body for operations without a richer result.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Password updated successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
