//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer. Domain conversion lives in
//! the repository modules that use them.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    conversations, event_images, events, feedback, messages, password_resets, users,
};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Identity columns. The password hash is selected separately.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub age: i16,
    pub role: String,
    pub verification_status: String,
    pub verification_comment: Option<String>,
    pub verification_submitted_at: Option<DateTime<Utc>>,
    pub verification_document: Option<Vec<u8>>,
    pub verification_document_type: Option<String>,
    pub contact_no: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub full_name: &'a str,
    pub age: i16,
    pub role: &'a str,
    pub password_hash: &'a str,
    pub verification_status: &'a str,
    pub verification_comment: Option<&'a str>,
    pub verification_submitted_at: Option<DateTime<Utc>>,
    pub verification_document: Option<&'a [u8]>,
    pub verification_document_type: Option<&'a str>,
    pub contact_no: Option<&'a str>,
    pub address: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Mutable identity columns. `None` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserUpdate<'a> {
    pub email: &'a str,
    pub full_name: &'a str,
    pub verification_status: &'a str,
    pub verification_comment: Option<&'a str>,
    pub verification_submitted_at: Option<DateTime<Utc>>,
    pub verification_document: Option<&'a [u8]>,
    pub verification_document_type: Option<&'a str>,
    pub contact_no: Option<&'a str>,
    pub address: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

/// Creator projection joined onto admin event listings.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CreatorRow {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: String,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub name: String,
    pub bar: String,
    pub location: String,
    pub cover_charge: f64,
    pub description: String,
    pub map_reference: String,
    pub status: String,
    pub admin_comment: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub bar: &'a str,
    pub location: &'a str,
    pub cover_charge: f64,
    pub description: &'a str,
    pub map_reference: &'a str,
    pub status: &'a str,
    pub admin_comment: Option<&'a str>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content and moderation columns. Images and audit origin stay untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EventUpdate<'a> {
    pub name: &'a str,
    pub bar: &'a str,
    pub location: &'a str,
    pub cover_charge: f64,
    pub description: &'a str,
    pub map_reference: &'a str,
    pub status: &'a str,
    pub admin_comment: Option<&'a str>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = event_images)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EventImageRow {
    pub event_id: Uuid,
    pub position: i16,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = event_images)]
pub(crate) struct NewEventImageRow<'a> {
    pub event_id: Uuid,
    pub position: i16,
    pub content_type: &'a str,
    pub data: &'a [u8],
}

// ---------------------------------------------------------------------------
// Conversations and messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = conversations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ConversationRow {
    pub id: Uuid,
    pub participant_low: Uuid,
    pub participant_high: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Message columns without the `seq` ordering key.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Feedback and reset codes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = feedback)]
pub(crate) struct NewFeedbackRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub description: &'a str,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = password_resets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResetCodeRow {
    pub email: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}
