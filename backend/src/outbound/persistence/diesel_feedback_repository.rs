//! PostgreSQL-backed `FeedbackRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::FeedbackRecord;
use crate::domain::ports::{FeedbackRepository, FeedbackRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewFeedbackRow;
use super::pool::DbPool;
use super::schema::feedback;

/// Diesel-backed implementation of the `FeedbackRepository` port.
#[derive(Clone)]
pub struct DieselFeedbackRepository {
    pool: DbPool,
}

impl DieselFeedbackRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FeedbackRepository for DieselFeedbackRepository {
    async fn insert(&self, record: &FeedbackRecord) -> Result<(), FeedbackRepositoryError> {
        let mut conn = self.pool.get().await.map_err(|err| {
            map_pool_error(err, |message| FeedbackRepositoryError::connection(message))
        })?;
        let row = NewFeedbackRow {
            id: record.id,
            email: record.email.as_ref(),
            description: &record.description,
            user_id: record.user_id.map(|id| *id.as_uuid()),
            created_at: record.created_at,
        };
        diesel::insert_into(feedback::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| {
                map_diesel_error(
                    err,
                    |message| FeedbackRepositoryError::query(message),
                    |message| FeedbackRepositoryError::connection(message),
                )
            })
    }
}
