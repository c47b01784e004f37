//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities shared by the HTTP, WebSocket and
//! persistence adapters, plus the services that drive the verification,
//! moderation, messaging, feedback and account workflows. Services talk to
//! infrastructure only through [`ports`].
//!
//! Public surface:
//! - `Error` / `ErrorCode`: transport-agnostic error payload.
//! - `Identity` / `RoleProfile`: account data keyed by role.
//! - `AgeVerification` / `EventRecord`: the two review state machines.
//! - `*Service` and `AccessGuard`: driving entry points for adapters.

pub mod access;
mod access_guard;
mod account_service;
pub mod auth;
pub mod blob;
pub mod error;
mod error_mapping;
pub mod event;
pub mod feedback;
mod feedback_service;
pub mod messaging;
mod messaging_service;
mod moderation_service;
pub mod password_reset;
pub mod ports;
mod projections;
pub mod trace_id;
pub mod user;
pub mod verification;
mod verification_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::access::{RoleRequirement, authorize};
pub use self::access_guard::AccessGuard;
pub use self::account_service::{
    AccountService, AccountServicePorts, AdminProfileEdit, BootstrapAccount, LoginOutcome,
};
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN, Password, PasswordChange,
    PasswordResetRequest, SignupParts, SignupRequest,
};
pub use self::blob::{
    EVENT_IMAGE_MAX_BYTES, ImageBlob, ImageBlobError, VERIFICATION_DOCUMENT_MAX_BYTES,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::event::{
    CoverCharge, EVENT_IMAGES_MAX, EventDetails, EventFields, EventId, EventPatch, EventRecord,
    EventRecordParts, EventValidationError, Moderation,
};
pub use self::feedback::{FeedbackRecord, FeedbackValidationError};
pub use self::feedback_service::FeedbackService;
pub use self::messaging::{
    Conversation, ConversationId, MESSAGE_MAX, Message, MessageBody, MessagingValidationError,
    ParticipantPair,
};
pub use self::messaging_service::MessagingService;
pub use self::moderation_service::ModerationService;
pub use self::password_reset::{RESET_CODE_TTL_MINUTES, ResetCode};
pub use self::projections::{
    CreatorSummary, EventListing, IdentityFilter, IdentitySummary, VerificationView,
};
pub use self::trace_id::TraceId;
pub use self::user::{
    AGE_MAX, AGE_MIN, AdminContact, Age, Email, FULL_NAME_MAX, FullName, Identity, IdentityDraft,
    IdentityValidationError, Role, RoleProfile, UserId,
};
pub use self::verification::{
    AgeVerification, ReviewDecision, ReviewState, SubmissionError, UnknownReviewState,
    VerificationStatus,
};
pub use self::verification_service::VerificationService;
