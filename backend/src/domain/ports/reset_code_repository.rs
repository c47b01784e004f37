//! Port for password-reset code storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Email, ResetCode};

use super::define_port_error;

define_port_error! {
    /// Errors raised by reset code repository adapters.
    pub enum ResetCodeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "reset code repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "reset code repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetCodeRepository: Send + Sync {
    /// Store an issued code.
    async fn insert(&self, code: &ResetCode) -> Result<(), ResetCodeRepositoryError>;

    /// Find an unexpired code matching `email` and `code`.
    async fn find_valid(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetCode>, ResetCodeRepositoryError>;

    /// Delete every code issued for `email`.
    async fn delete_for_email(&self, email: &Email) -> Result<(), ResetCodeRepositoryError>;

    /// Delete codes that expired at or before `now`. Returns the count removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ResetCodeRepositoryError>;
}
