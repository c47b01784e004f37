//! Emailed password-reset codes.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::domain::Email;

/// Lifetime of an issued code, in minutes.
pub const RESET_CODE_TTL_MINUTES: i64 = 10;

/// A six-digit code bound to an email address.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetCode {
    /// Account email.
    pub email: Email,
    /// Six decimal digits.
    pub code: String,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl ResetCode {
    /// Issue a fresh random code for `email`.
    #[must_use]
    pub fn issue(email: Email, now: DateTime<Utc>) -> Self {
        let code = rand::thread_rng().gen_range(100_000..=999_999_u32);
        Self {
            email,
            code: code.to_string(),
            expires_at: now + Duration::minutes(RESET_CODE_TTL_MINUTES),
        }
    }

    /// Whether the code is still redeemable at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

impl std::fmt::Debug for ResetCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetCode")
            .field("email", &self.email)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}
