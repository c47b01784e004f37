//! Port for delivering password-reset codes.

use async_trait::async_trait;

use crate::domain::Email;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum ResetCodeMailerError {
        /// Message could not be built.
        Compose { message: String } => "reset email could not be composed: {message}",
        /// Transport rejected or failed to deliver the message.
        Delivery { message: String } => "reset email delivery failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetCodeMailer: Send + Sync {
    /// Send `code` to `recipient`.
    async fn send_reset_code(
        &self,
        recipient: &Email,
        code: &str,
    ) -> Result<(), ResetCodeMailerError>;
}
