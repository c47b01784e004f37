//! Reset-code delivery adapters.

mod log_mailer;
mod smtp_mailer;

pub use log_mailer::LogMailer;
pub use smtp_mailer::{SmtpMailer, SmtpSettings, SmtpSetupError};

const RESET_SUBJECT: &str = "Your password reset code";

fn reset_body(code: &str) -> String {
    format!(
        "Use code {code} to reset your password. The code expires in {} minutes.\n",
        crate::domain::RESET_CODE_TTL_MINUTES
    )
}
