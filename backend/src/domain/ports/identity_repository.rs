//! Port abstraction for identity persistence adapters and their errors.
//!
//! Password hashes travel separately from [`Identity`] so a loaded identity
//! never carries its secret.

use async_trait::async_trait;

use crate::domain::{Email, Identity, IdentityFilter, Role, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by identity repository adapters.
    pub enum IdentityRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "identity repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "identity repository query failed: {message}",
        /// Another identity already uses the email.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Identity paired with its stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account record.
    pub identity: Identity,
    /// PHC-formatted password hash.
    pub password_hash: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Insert a new identity with its password hash.
    async fn insert(
        &self,
        identity: &Identity,
        password_hash: &str,
    ) -> Result<(), IdentityRepositoryError>;

    /// Fetch an identity by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<Identity>, IdentityRepositoryError>;

    /// Fetch an identity by normalised email.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<Identity>, IdentityRepositoryError>;

    /// Fetch an identity together with its password hash.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, IdentityRepositoryError>;

    /// Read the password hash for an identity.
    async fn password_hash(&self, id: &UserId) -> Result<Option<String>, IdentityRepositoryError>;

    /// Persist profile and verification changes. The password is untouched.
    async fn save(&self, identity: &Identity) -> Result<(), IdentityRepositoryError>;

    /// Replace the password hash for an identity.
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), IdentityRepositoryError>;

    /// Hard-delete an identity. Returns whether a row was removed.
    async fn delete(&self, id: &UserId) -> Result<bool, IdentityRepositoryError>;

    /// List identities matching `filter`, newest first.
    async fn list(&self, filter: IdentityFilter) -> Result<Vec<Identity>, IdentityRepositoryError>;

    /// Users whose verification is pending with a submitted document.
    async fn list_pending_verifications(&self) -> Result<Vec<Identity>, IdentityRepositoryError>;

    /// Identities with `role`, excluding `exclude`.
    async fn list_by_role_excluding(
        &self,
        role: Role,
        exclude: &UserId,
    ) -> Result<Vec<Identity>, IdentityRepositoryError>;
}
