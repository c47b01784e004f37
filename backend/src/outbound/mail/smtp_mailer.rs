//! SMTP delivery via lettre's Tokio transport.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use super::{RESET_SUBJECT, reset_body};
use crate::domain::Email;
use crate::domain::ports::{ResetCodeMailer, ResetCodeMailerError};

/// Connection settings for the SMTP relay.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// Relay host name.
    pub host: String,
    /// Relay port, usually 587 for STARTTLS.
    pub port: u16,
    /// Optional login.
    pub username: Option<String>,
    /// Optional password, used with `username`.
    pub password: Option<String>,
    /// Sender address, e.g. `Nightlist <no-reply@example.com>`.
    pub from: String,
}

/// Errors raised while building the SMTP transport.
#[derive(Debug, thiserror::Error)]
pub enum SmtpSetupError {
    /// The sender address did not parse as a mailbox.
    #[error("invalid sender address {from}: {message}")]
    InvalidSender { from: String, message: String },
    /// The relay could not be configured.
    #[error("invalid SMTP relay {host}: {message}")]
    Relay { host: String, message: String },
}

/// Sends reset codes through an authenticated STARTTLS relay.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Build the relay transport. No connection is opened until the first send.
    pub fn new(settings: SmtpSettings) -> Result<Self, SmtpSetupError> {
        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|err| SmtpSetupError::InvalidSender {
                from: settings.from.clone(),
                message: err.to_string(),
            })?;
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|err| SmtpSetupError::Relay {
                host: settings.host.clone(),
                message: err.to_string(),
            })?
            .port(settings.port);
        if let (Some(username), Some(password)) = (settings.username, settings.password) {
            builder = builder.credentials(Credentials::new(username, password));
        }
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn compose(&self, recipient: &Email, code: &str) -> Result<Message, ResetCodeMailerError> {
        let to = recipient
            .as_ref()
            .parse::<Mailbox>()
            .map_err(|err| ResetCodeMailerError::compose(err.to_string()))?;
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(RESET_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(reset_body(code))
            .map_err(|err| ResetCodeMailerError::compose(err.to_string()))
    }
}

#[async_trait]
impl ResetCodeMailer for SmtpMailer {
    async fn send_reset_code(
        &self,
        recipient: &Email,
        code: &str,
    ) -> Result<(), ResetCodeMailerError> {
        let message = self.compose(recipient, code)?;
        self.transport.send(message).await.map_err(|err| {
            debug!(error = %err, "smtp relay rejected reset email");
            ResetCodeMailerError::delivery(err.to_string())
        })?;
        info!(recipient = %recipient, "reset code dispatched over smtp");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn settings(from: &str) -> SmtpSettings {
        SmtpSettings {
            host: "smtp.example.com".to_owned(),
            port: 587,
            username: Some("mailer".to_owned()),
            password: Some("secret".to_owned()),
            from: from.to_owned(),
        }
    }

    #[rstest]
    fn invalid_sender_is_rejected() {
        let err = SmtpMailer::new(settings("not an address")).expect_err("invalid sender");
        assert!(matches!(err, SmtpSetupError::InvalidSender { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn composed_message_carries_code_and_recipient() {
        let mailer =
            SmtpMailer::new(settings("Nightlist <no-reply@example.com>")).expect("mailer");
        let recipient = Email::new("guest@example.com").expect("email");
        let message = mailer.compose(&recipient, "424242").expect("compose");
        let raw = String::from_utf8(message.formatted()).expect("utf8 message");
        assert!(raw.contains("To: guest@example.com"));
        assert!(raw.contains("424242"));
    }
}
