//! Port for the append-only feedback sink.

use async_trait::async_trait;

use crate::domain::FeedbackRecord;

use super::define_port_error;

define_port_error! {
    /// Errors raised by feedback repository adapters.
    pub enum FeedbackRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "feedback repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "feedback repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Persist a feedback record.
    async fn insert(&self, record: &FeedbackRecord) -> Result<(), FeedbackRepositoryError>;
}
