//! Diesel table definitions for the PostgreSQL schema.
//!
//! Must match `backend/migrations` exactly; regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Accounts of every role.
    ///
    /// Verification columns are only meaningful for `role = 'user'`; other
    /// roles store `verification_status = 'not_applicable'`.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        full_name -> Varchar,
        age -> Int2,
        role -> Varchar,
        password_hash -> Text,
        verification_status -> Varchar,
        verification_comment -> Nullable<Text>,
        verification_submitted_at -> Nullable<Timestamptz>,
        verification_document -> Nullable<Bytea>,
        verification_document_type -> Nullable<Varchar>,
        contact_no -> Nullable<Varchar>,
        address -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Event listings with moderation state.
    events (id) {
        id -> Uuid,
        name -> Text,
        bar -> Text,
        location -> Text,
        cover_charge -> Float8,
        description -> Text,
        map_reference -> Text,
        status -> Varchar,
        admin_comment -> Nullable<Text>,
        reviewed_at -> Nullable<Timestamptz>,
        created_by -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Event images in upload order; deleted with their event.
    event_images (event_id, position) {
        event_id -> Uuid,
        position -> Int2,
        content_type -> Varchar,
        data -> Bytea,
    }
}

diesel::table! {
    /// One row per unordered participant pair.
    conversations (id) {
        id -> Uuid,
        participant_low -> Uuid,
        participant_high -> Uuid,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only messages; `seq` defines thread order.
    messages (seq) {
        seq -> Int8,
        id -> Uuid,
        conversation_id -> Uuid,
        sender_id -> Uuid,
        receiver_id -> Uuid,
        body -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    feedback (id) {
        id -> Uuid,
        email -> Varchar,
        description -> Text,
        user_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Short-lived password reset codes.
    password_resets (id) {
        id -> Int8,
        email -> Varchar,
        code -> Varchar,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(events -> users (created_by));
diesel::joinable!(event_images -> events (event_id));
diesel::joinable!(messages -> conversations (conversation_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    events,
    event_images,
    conversations,
    messages,
    feedback,
    password_resets,
);
