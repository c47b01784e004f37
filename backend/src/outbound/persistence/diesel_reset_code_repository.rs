//! PostgreSQL-backed `ResetCodeRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ResetCodeRepository, ResetCodeRepositoryError};
use crate::domain::{Email, ResetCode};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::ResetCodeRow;
use super::pool::{DbPool, PoolError};
use super::schema::password_resets;

/// Diesel-backed implementation of the `ResetCodeRepository` port.
#[derive(Clone)]
pub struct DieselResetCodeRepository {
    pool: DbPool,
}

impl DieselResetCodeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ResetCodeRepositoryError {
    map_pool_error(error, |message| ResetCodeRepositoryError::connection(message))
}

fn diesel_error(error: diesel::result::Error) -> ResetCodeRepositoryError {
    map_diesel_error(
        error,
        |message| ResetCodeRepositoryError::query(message),
        |message| ResetCodeRepositoryError::connection(message),
    )
}

#[async_trait]
impl ResetCodeRepository for DieselResetCodeRepository {
    async fn insert(&self, code: &ResetCode) -> Result<(), ResetCodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = ResetCodeRow {
            email: code.email.as_ref().to_owned(),
            code: code.code.clone(),
            expires_at: code.expires_at,
        };
        diesel::insert_into(password_resets::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_valid(
        &self,
        email: &Email,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetCode>, ResetCodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<ResetCodeRow> = password_resets::table
            .filter(password_resets::email.eq(email.as_ref()))
            .filter(password_resets::code.eq(code))
            .filter(password_resets::expires_at.gt(now))
            .select(ResetCodeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        Ok(row.map(|row| ResetCode {
            email: email.clone(),
            code: row.code,
            expires_at: row.expires_at,
        }))
    }

    async fn delete_for_email(&self, email: &Email) -> Result<(), ResetCodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::delete(password_resets::table.filter(password_resets::email.eq(email.as_ref())))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ResetCodeRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed =
            diesel::delete(password_resets::table.filter(password_resets::expires_at.le(now)))
                .execute(&mut conn)
                .await
                .map_err(diesel_error)?;
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}
