//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports only: services in [`crate::domain`] call these traits and
//! outbound adapters implement them. Each port has its own error enum built
//! with `define_port_error!`.

mod macros;
pub(crate) use macros::define_port_error;

mod conversation_repository;
mod event_repository;
mod feedback_repository;
mod identity_repository;
mod message_notifier;
mod password_hasher;
mod reset_code_mailer;
mod reset_code_repository;
mod token_codec;

#[cfg(test)]
pub use conversation_repository::MockConversationRepository;
pub use conversation_repository::{ConversationRepository, ConversationRepositoryError};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError};
#[cfg(test)]
pub use feedback_repository::MockFeedbackRepository;
pub use feedback_repository::{FeedbackRepository, FeedbackRepositoryError};
#[cfg(test)]
pub use identity_repository::MockIdentityRepository;
pub use identity_repository::{IdentityRepository, IdentityRepositoryError, StoredCredentials};
#[cfg(test)]
pub use message_notifier::MockMessageNotifier;
pub use message_notifier::{MessageNotifier, MessageNotifierError, NoOpMessageNotifier};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use reset_code_mailer::MockResetCodeMailer;
pub use reset_code_mailer::{ResetCodeMailer, ResetCodeMailerError};
#[cfg(test)]
pub use reset_code_repository::MockResetCodeRepository;
pub use reset_code_repository::{ResetCodeRepository, ResetCodeRepositoryError};
#[cfg(test)]
pub use token_codec::MockTokenCodec;
pub use token_codec::{IssuedToken, TOKEN_TTL_SECONDS, TokenCodec, TokenCodecError};
