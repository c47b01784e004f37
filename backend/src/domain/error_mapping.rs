//! Shared mapping from port failures to domain errors.
//!
//! Connection failures surface as `service_unavailable`; everything else a
//! store reports is `internal` and redacted at the HTTP boundary.

use tracing::debug;

use crate::domain::Error;
use crate::domain::ports::{
    ConversationRepositoryError, EventRepositoryError, FeedbackRepositoryError,
    IdentityRepositoryError, PasswordHasherError, ResetCodeMailerError, ResetCodeRepositoryError,
    TokenCodecError,
};

pub(crate) fn map_identity_error(error: IdentityRepositoryError) -> Error {
    match error {
        IdentityRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("identity store unavailable: {message}"))
        }
        IdentityRepositoryError::Query { message } => {
            Error::internal(format!("identity store error: {message}"))
        }
        IdentityRepositoryError::DuplicateEmail { .. } => Error::conflict("User already exists"),
    }
}

pub(crate) fn map_event_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event store unavailable: {message}"))
        }
        EventRepositoryError::Query { message } => {
            Error::internal(format!("event store error: {message}"))
        }
    }
}

pub(crate) fn map_conversation_error(error: ConversationRepositoryError) -> Error {
    match error {
        ConversationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("conversation store unavailable: {message}"))
        }
        ConversationRepositoryError::Query { message } => {
            Error::internal(format!("conversation store error: {message}"))
        }
        ConversationRepositoryError::PairTaken => {
            Error::internal("conversation create raced and lost twice")
        }
    }
}

pub(crate) fn map_feedback_error(error: FeedbackRepositoryError) -> Error {
    match error {
        FeedbackRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("feedback store unavailable: {message}"))
        }
        FeedbackRepositoryError::Query { message } => {
            Error::internal(format!("feedback store error: {message}"))
        }
    }
}

pub(crate) fn map_reset_code_error(error: ResetCodeRepositoryError) -> Error {
    match error {
        ResetCodeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reset code store unavailable: {message}"))
        }
        ResetCodeRepositoryError::Query { message } => {
            Error::internal(format!("reset code store error: {message}"))
        }
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_mailer_error(error: ResetCodeMailerError) -> Error {
    match error {
        ResetCodeMailerError::Compose { message } => Error::internal(message),
        ResetCodeMailerError::Delivery { message } => {
            Error::service_unavailable(format!("mail transport unavailable: {message}"))
        }
    }
}

/// Token failures become `unauthorized` with a machine-readable detail code.
pub(crate) fn map_token_error(error: TokenCodecError) -> Error {
    debug!(%error, "bearer token rejected");
    match error {
        TokenCodecError::Encode { message } => Error::internal(message),
        TokenCodecError::Expired | TokenCodecError::Invalid { .. } => {
            invalid_token_error()
        }
    }
}

pub(crate) fn invalid_token_error() -> Error {
    Error::unauthorized("Not authorized, token failed")
        .with_details(serde_json::json!({ "code": "invalid_token" }))
}

pub(crate) fn missing_token_error() -> Error {
    Error::unauthorized("Not authorized, no token")
        .with_details(serde_json::json!({ "code": "missing_token" }))
}
