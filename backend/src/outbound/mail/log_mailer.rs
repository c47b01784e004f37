//! Mailer that records dispatch in the log instead of sending mail.

use async_trait::async_trait;
use tracing::{debug, info};

use super::{RESET_SUBJECT, reset_body};
use crate::domain::Email;
use crate::domain::ports::{ResetCodeMailer, ResetCodeMailerError};

/// Logs each reset-code dispatch. The code itself only appears in debug builds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl ResetCodeMailer for LogMailer {
    async fn send_reset_code(
        &self,
        recipient: &Email,
        code: &str,
    ) -> Result<(), ResetCodeMailerError> {
        info!(recipient = %recipient, subject = RESET_SUBJECT, "reset code dispatched");
        if cfg!(debug_assertions) {
            debug!(recipient = %recipient, body = %reset_body(code), "reset code body");
        }
        Ok(())
    }
}
