//! PostgreSQL-backed `IdentityRepository` implementation using Diesel ORM.
//!
//! Role-specific columns are flattened into the `users` table. Rows are
//! folded back into a [`RoleProfile`] on read; non-user rows always store
//! `not_applicable` as their verification status.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{IdentityRepository, IdentityRepositoryError, StoredCredentials};
use crate::domain::{
    AdminContact, Age, AgeVerification, Email, FullName, Identity, IdentityDraft, IdentityFilter,
    ImageBlob, ReviewState, Role, RoleProfile, UserId, VerificationStatus,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error, unique_violation};
use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `IdentityRepository` port.
#[derive(Clone)]
pub struct DieselIdentityRepository {
    pool: DbPool,
}

impl DieselIdentityRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> IdentityRepositoryError {
    map_pool_error(error, |message| IdentityRepositoryError::connection(message))
}

fn diesel_error(error: diesel::result::Error) -> IdentityRepositoryError {
    map_diesel_error(
        error,
        |message| IdentityRepositoryError::query(message),
        |message| IdentityRepositoryError::connection(message),
    )
}

fn write_error(error: diesel::result::Error, email: &Email) -> IdentityRepositoryError {
    if unique_violation(&error).is_some() {
        return IdentityRepositoryError::duplicate_email(email.as_ref());
    }
    diesel_error(error)
}

fn corrupt(column: &str) -> IdentityRepositoryError {
    IdentityRepositoryError::query(format!("stored identity has invalid {column}"))
}

/// Role-dependent columns derived from an identity.
struct ProfileColumns<'a> {
    status: &'static str,
    comment: Option<&'a str>,
    submitted_at: Option<chrono::DateTime<Utc>>,
    document: Option<&'a ImageBlob>,
    contact: Option<&'a AdminContact>,
}

fn profile_columns(identity: &Identity) -> ProfileColumns<'_> {
    let mut columns = ProfileColumns {
        status: VerificationStatus::NotApplicable.as_str(),
        comment: None,
        submitted_at: None,
        document: None,
        contact: None,
    };
    match identity.profile() {
        RoleProfile::User(record) => {
            columns.status = record.state().as_str();
            columns.comment = record.comment();
            columns.submitted_at = record.submitted_at();
            columns.document = record.document();
        }
        RoleProfile::Admin(contact) => columns.contact = Some(contact),
        RoleProfile::Vendor => {}
    }
    columns
}

fn row_to_identity(row: UserRow) -> Result<Identity, IdentityRepositoryError> {
    let role: Role = row.role.parse().map_err(|_| corrupt("role"))?;
    let profile = match role {
        Role::User => {
            let state: ReviewState = row
                .verification_status
                .parse()
                .map_err(|_| corrupt("verification status"))?;
            let document = match (row.verification_document, row.verification_document_type) {
                (Some(data), Some(content_type)) => {
                    Some(ImageBlob::from_stored(content_type, data))
                }
                _ => None,
            };
            RoleProfile::User(AgeVerification::from_parts(
                document,
                state,
                row.verification_comment,
                row.verification_submitted_at,
            ))
        }
        Role::Admin => RoleProfile::Admin(AdminContact {
            contact_no: row.contact_no,
            address: row.address,
        }),
        Role::Vendor => RoleProfile::Vendor,
    };
    let draft = IdentityDraft {
        id: UserId::from_uuid(row.id),
        email: Email::new(&row.email).map_err(|_| corrupt("email"))?,
        full_name: FullName::new(&row.full_name).map_err(|_| corrupt("full name"))?,
        age: Age::new(i64::from(row.age)).map_err(|_| corrupt("age"))?,
        created_at: row.created_at,
    };
    Ok(Identity::new(draft, profile))
}

fn rows_to_identities(rows: Vec<UserRow>) -> Result<Vec<Identity>, IdentityRepositoryError> {
    rows.into_iter().map(row_to_identity).collect()
}

#[async_trait]
impl IdentityRepository for DieselIdentityRepository {
    async fn insert(
        &self,
        identity: &Identity,
        password_hash: &str,
    ) -> Result<(), IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let columns = profile_columns(identity);
        let contact = columns.contact;
        let row = NewUserRow {
            id: *identity.id().as_uuid(),
            email: identity.email().as_ref(),
            full_name: identity.full_name().as_ref(),
            age: i16::from(identity.age().years()),
            role: identity.role().as_str(),
            password_hash,
            verification_status: columns.status,
            verification_comment: columns.comment,
            verification_submitted_at: columns.submitted_at,
            verification_document: columns.document.map(ImageBlob::data),
            verification_document_type: columns.document.map(ImageBlob::content_type),
            contact_no: contact.and_then(|c| c.contact_no.as_deref()),
            address: contact.and_then(|c| c.address.as_deref()),
            created_at: identity.created_at(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| write_error(err, identity.email()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<Identity>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_identity).transpose()
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Identity>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(row_to_identity).transpose()
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row: Option<(UserRow, String)> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select((UserRow::as_select(), users::password_hash))
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;
        row.map(|(row, password_hash)| {
            Ok(StoredCredentials {
                identity: row_to_identity(row)?,
                password_hash,
            })
        })
        .transpose()
    }

    async fn password_hash(&self, id: &UserId) -> Result<Option<String>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(users::password_hash)
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)
    }

    async fn save(&self, identity: &Identity) -> Result<(), IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let columns = profile_columns(identity);
        let contact = columns.contact;
        let update = UserUpdate {
            email: identity.email().as_ref(),
            full_name: identity.full_name().as_ref(),
            verification_status: columns.status,
            verification_comment: columns.comment,
            verification_submitted_at: columns.submitted_at,
            verification_document: columns.document.map(ImageBlob::data),
            verification_document_type: columns.document.map(ImageBlob::content_type),
            contact_no: contact.and_then(|c| c.contact_no.as_deref()),
            address: contact.and_then(|c| c.address.as_deref()),
            updated_at: Utc::now(),
        };

        let updated = diesel::update(users::table.find(identity.id().as_uuid()))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(|err| write_error(err, identity.email()))?;
        if updated == 0 {
            return Err(IdentityRepositoryError::query("record not found"));
        }
        Ok(())
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::password_hash.eq(password_hash),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        if updated == 0 {
            return Err(IdentityRepositoryError::query("record not found"));
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let removed = diesel::delete(users::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(removed > 0)
    }

    async fn list(&self, filter: IdentityFilter) -> Result<Vec<Identity>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let mut query = users::table
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .into_boxed();
        if let Some(role) = filter.role {
            query = query.filter(users::role.eq(role.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(users::verification_status.eq(status.as_str()));
        }
        let rows = query.load(&mut conn).await.map_err(diesel_error)?;
        rows_to_identities(rows)
    }

    async fn list_pending_verifications(&self) -> Result<Vec<Identity>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = users::table
            .filter(users::role.eq(Role::User.as_str()))
            .filter(users::verification_status.eq(ReviewState::Pending.as_str()))
            .filter(users::verification_document.is_not_null())
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_identities(rows)
    }

    async fn list_by_role_excluding(
        &self,
        role: Role,
        exclude: &UserId,
    ) -> Result<Vec<Identity>, IdentityRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows = users::table
            .filter(users::role.eq(role.as_str()))
            .filter(users::id.ne(exclude.as_uuid()))
            .select(UserRow::as_select())
            .order(users::created_at.desc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows_to_identities(rows)
    }
}
