//! Port for issuing and decoding bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

/// Lifetime of an issued token, in seconds.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

define_port_error! {
    /// Errors raised by token codecs.
    pub enum TokenCodecError {
        /// Token expiry has passed.
        Expired => "token expired",
        /// Signature, structure or subject was invalid.
        Invalid { message: String } => "token invalid: {message}",
        /// Signing failed.
        Encode { message: String } => "token encoding failed: {message}",
    }
}

/// Freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Compact serialised token.
    pub token: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenCodec: Send + Sync {
    /// Sign a token for `subject` issued at `now`.
    fn issue(&self, subject: &UserId, now: DateTime<Utc>) -> Result<IssuedToken, TokenCodecError>;

    /// Verify a token and return its subject.
    fn decode(&self, token: &str) -> Result<UserId, TokenCodecError>;
}
