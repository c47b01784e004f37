//! Port for one-way password hashing.

use crate::domain::Password;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing or hash parsing failed.
        Hash { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes and verifies secrets. Implementations are CPU bound and synchronous.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a PHC-formatted hash with a fresh salt.
    fn hash(&self, password: &Password) -> Result<String, PasswordHasherError>;

    /// Check `password` against a stored hash.
    fn verify(&self, password: &Password, hash: &str) -> Result<bool, PasswordHasherError>;
}
