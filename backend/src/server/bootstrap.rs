//! Startup seeding of administrator and vendor accounts.
//!
//! Admin and vendor accounts cannot sign up, so operators list them in a JSON
//! file passed as `NIGHTLIST_BOOTSTRAP_ACCOUNTS`:
//!
//! ```json
//! [{"fullName":"Root","email":"root@example.com","password":"…","age":40,"role":"admin"}]
//! ```
//!
//! Accounts whose email already exists are left untouched.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use nightlist::domain::{
    AccountService, Age, BootstrapAccount, CredentialValidationError, Email, FullName,
    IdentityValidationError, Password, Role,
};

/// Errors raised while reading the bootstrap file.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("bootstrap entry {index}: {source}")]
    Identity {
        index: usize,
        source: IdentityValidationError,
    },
    #[error("bootstrap entry {index}: {source}")]
    Credential {
        index: usize,
        source: CredentialValidationError,
    },
    #[error("failed to seed {email}: {message}")]
    Seed { email: String, message: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BootstrapEntry {
    full_name: String,
    email: String,
    password: String,
    age: i64,
    role: String,
}

impl BootstrapEntry {
    fn into_account(self, index: usize) -> Result<BootstrapAccount, BootstrapError> {
        let identity = |source| BootstrapError::Identity { index, source };
        Ok(BootstrapAccount {
            full_name: FullName::new(&self.full_name).map_err(identity)?,
            email: Email::new(&self.email).map_err(identity)?,
            password: Password::new_secret(&self.password)
                .map_err(|source| BootstrapError::Credential { index, source })?,
            age: Age::new(self.age).map_err(identity)?,
            role: self.role.parse::<Role>().map_err(identity)?,
        })
    }
}

/// Parse and validate every entry in the bootstrap file.
pub fn load_bootstrap_accounts(path: &Path) -> Result<Vec<BootstrapAccount>, BootstrapError> {
    let raw = std::fs::read_to_string(path).map_err(|source| BootstrapError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<BootstrapEntry> =
        serde_json::from_str(&raw).map_err(|source| BootstrapError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_account(index))
        .collect()
}

/// Create the listed accounts, returning how many were new.
pub async fn seed_bootstrap_accounts(
    accounts: &AccountService,
    entries: Vec<BootstrapAccount>,
) -> Result<usize, BootstrapError> {
    let mut created = 0;
    for account in entries {
        let email = account.email.to_string();
        let role = account.role;
        let inserted = accounts
            .bootstrap(account)
            .await
            .map_err(|err| BootstrapError::Seed {
                email: email.clone(),
                message: err.message().to_owned(),
            })?;
        if inserted {
            info!(%email, %role, "bootstrap account created");
            created += 1;
        }
    }
    Ok(created)
}
