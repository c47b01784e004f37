//! Account lifecycle: signup, login, password reset and self-service edits.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use crate::domain::error_mapping::{
    map_hasher_error, map_identity_error, map_mailer_error, map_reset_code_error,
    map_token_error,
};
use crate::domain::ports::{
    IdentityRepository, IdentityRepositoryError, IssuedToken, PasswordHasher, ResetCodeMailer,
    ResetCodeRepository, TokenCodec,
};
use crate::domain::{
    AdminContact, Age, Email, Error, FullName, Identity, IdentityDraft, LoginCredentials,
    Password, PasswordChange, PasswordResetRequest, ResetCode, Role, RoleProfile,
    RoleRequirement, SignupRequest, UserId, authorize,
};

/// Ports the account service drives.
#[derive(Clone)]
pub struct AccountServicePorts {
    /// Identity store.
    pub identities: Arc<dyn IdentityRepository>,
    /// Password hashing.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Token signing.
    pub tokens: Arc<dyn TokenCodec>,
    /// Reset code store.
    pub reset_codes: Arc<dyn ResetCodeRepository>,
    /// Reset code delivery.
    pub mailer: Arc<dyn ResetCodeMailer>,
}

/// Successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Signed bearer token.
    pub token: IssuedToken,
    /// Authenticated identity.
    pub identity: Identity,
}

/// Operator-provisioned account seeded at startup.
#[derive(Debug, Clone)]
pub struct BootstrapAccount {
    /// Display name.
    pub full_name: FullName,
    /// Login email.
    pub email: Email,
    /// Initial password.
    pub password: Password,
    /// Age in years.
    pub age: Age,
    /// Assigned role.
    pub role: Role,
}

/// Optional admin profile fields. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminProfileEdit {
    /// Replacement display name.
    pub full_name: Option<FullName>,
    /// Replacement login email.
    pub email: Option<Email>,
    /// Replacement contact number.
    pub contact_no: Option<String>,
    /// Replacement postal address.
    pub address: Option<String>,
}

/// Account use-cases.
#[derive(Clone)]
pub struct AccountService {
    ports: AccountServicePorts,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Create the service over its ports and a clock.
    pub fn new(ports: AccountServicePorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    async fn create_identity(
        &self,
        draft: IdentityDraft,
        role: Role,
        password: &Password,
    ) -> Result<Identity, Error> {
        let hash = self.ports.hasher.hash(password).map_err(map_hasher_error)?;
        let identity = Identity::new(draft, RoleProfile::for_role(role));
        self.ports
            .identities
            .insert(&identity, &hash)
            .await
            .map_err(map_identity_error)?;
        Ok(identity)
    }

    async fn ensure_email_free(&self, email: &Email) -> Result<(), Error> {
        let existing = self
            .ports
            .identities
            .find_by_email(email)
            .await
            .map_err(map_identity_error)?;
        match existing {
            Some(_) => Err(Error::conflict("User already exists")),
            None => Ok(()),
        }
    }

    /// Register a new `user` identity with pending verification.
    pub async fn signup(&self, request: SignupRequest) -> Result<Identity, Error> {
        self.ensure_email_free(request.email()).await?;
        let draft = IdentityDraft {
            id: UserId::random(),
            email: request.email().clone(),
            full_name: request.full_name().clone(),
            age: request.age(),
            created_at: self.clock.utc(),
        };
        let identity = self
            .create_identity(draft, Role::User, request.password())
            .await?;
        info!(user_id = %identity.id(), "identity registered");
        Ok(identity)
    }

    /// Seed an operator account. Returns `false` when the email already exists.
    pub async fn bootstrap(&self, account: BootstrapAccount) -> Result<bool, Error> {
        let existing = self
            .ports
            .identities
            .find_by_email(&account.email)
            .await
            .map_err(map_identity_error)?;
        if existing.is_some() {
            debug!(email = %account.email, "bootstrap account already present");
            return Ok(false);
        }
        let draft = IdentityDraft {
            id: UserId::random(),
            email: account.email,
            full_name: account.full_name,
            age: account.age,
            created_at: self.clock.utc(),
        };
        let identity = self
            .create_identity(draft, account.role, &account.password)
            .await?;
        info!(user_id = %identity.id(), role = %identity.role(), "bootstrap account created");
        Ok(true)
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<LoginOutcome, Error> {
        let invalid = || Error::unauthorized("Invalid credentials");
        let stored = self
            .ports
            .identities
            .find_credentials(credentials.email())
            .await
            .map_err(map_identity_error)?
            .ok_or_else(invalid)?;
        let matches = self
            .ports
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(invalid());
        }
        let token = self
            .ports
            .tokens
            .issue(stored.identity.id(), self.clock.utc())
            .map_err(map_token_error)?;
        Ok(LoginOutcome {
            token,
            identity: stored.identity,
        })
    }

    /// Issue and send a reset code for a known email.
    pub async fn forgot_password(&self, email: &Email) -> Result<(), Error> {
        let known = self
            .ports
            .identities
            .find_by_email(email)
            .await
            .map_err(map_identity_error)?;
        if known.is_none() {
            return Err(Error::not_found("User not found"));
        }
        let now = self.clock.utc();
        self.purge_expired_codes(now).await?;
        let code = ResetCode::issue(email.clone(), now);
        self.ports
            .reset_codes
            .insert(&code)
            .await
            .map_err(map_reset_code_error)?;
        self.ports
            .mailer
            .send_reset_code(email, &code.code)
            .await
            .map_err(map_mailer_error)
    }

    async fn purge_expired_codes(&self, now: chrono::DateTime<chrono::Utc>) -> Result<(), Error> {
        let purged = self
            .ports
            .reset_codes
            .purge_expired(now)
            .await
            .map_err(map_reset_code_error)?;
        if purged > 0 {
            debug!(purged, "expired reset codes purged");
        }
        Ok(())
    }

    /// Redeem a reset code and replace the password.
    pub async fn reset_password(&self, request: PasswordResetRequest) -> Result<(), Error> {
        let now = self.clock.utc();
        self.purge_expired_codes(now).await?;
        self.ports
            .reset_codes
            .find_valid(request.email(), request.code(), now)
            .await
            .map_err(map_reset_code_error)?
            .ok_or_else(|| Error::invalid_request("Invalid or expired code"))?;
        let identity = self
            .ports
            .identities
            .find_by_email(request.email())
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        self.replace_password(identity.id(), request.new_password())
            .await?;
        self.ports
            .reset_codes
            .delete_for_email(request.email())
            .await
            .map_err(map_reset_code_error)
    }

    async fn replace_password(&self, id: &UserId, password: &Password) -> Result<(), Error> {
        let hash = self.ports.hasher.hash(password).map_err(map_hasher_error)?;
        self.ports
            .identities
            .update_password_hash(id, &hash)
            .await
            .map_err(map_identity_error)
    }

    async fn check_password(
        &self,
        id: &UserId,
        password: &Password,
        incorrect: &'static str,
    ) -> Result<(), Error> {
        let hash = self
            .ports
            .identities
            .password_hash(id)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found("User not found"))?;
        let matches = self
            .ports
            .hasher
            .verify(password, &hash)
            .map_err(map_hasher_error)?;
        if matches {
            Ok(())
        } else {
            Err(Error::invalid_request(incorrect))
        }
    }

    /// Reload the caller's own identity.
    pub async fn profile(&self, id: &UserId) -> Result<Identity, Error> {
        self.ports
            .identities
            .find_by_id(id)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Change the caller's password after checking the current one.
    pub async fn change_password(
        &self,
        caller: &Identity,
        change: PasswordChange,
    ) -> Result<(), Error> {
        self.check_password(caller.id(), change.current(), "Current password is incorrect")
            .await?;
        self.replace_password(caller.id(), change.new_password())
            .await
    }

    /// Hard-delete the caller's account.
    pub async fn delete_account(&self, caller: &Identity, password: &str) -> Result<(), Error> {
        let password = Password::new(password)
            .map_err(|_| Error::invalid_request("Password is required to delete account"))?;
        self.check_password(caller.id(), &password, "Password is incorrect")
            .await?;
        let removed = self
            .ports
            .identities
            .delete(caller.id())
            .await
            .map_err(map_identity_error)?;
        if !removed {
            return Err(Error::not_found("User not found"));
        }
        info!(user_id = %caller.id(), "account deleted");
        Ok(())
    }

    /// Update an admin's own name, email and contact details.
    pub async fn edit_admin_profile(
        &self,
        caller: &Identity,
        edit: AdminProfileEdit,
    ) -> Result<Identity, Error> {
        authorize(caller, RoleRequirement::Admin)?;
        let mut identity = self.profile(caller.id()).await?;
        let AdminProfileEdit {
            full_name,
            email,
            contact_no,
            address,
        } = edit;

        if let Some(email) = email {
            let holder = self
                .ports
                .identities
                .find_by_email(&email)
                .await
                .map_err(map_identity_error)?;
            if holder.is_some_and(|other| other.id() != identity.id()) {
                return Err(Error::conflict("Email is already in use"));
            }
            identity.set_email(email);
        }
        if let Some(full_name) = full_name {
            identity.set_full_name(full_name);
        }
        if let Some(contact) = identity.admin_contact_mut() {
            let AdminContact {
                contact_no: stored_contact,
                address: stored_address,
            } = contact;
            if contact_no.is_some() {
                *stored_contact = contact_no;
            }
            if address.is_some() {
                *stored_address = address;
            }
        }

        self.ports
            .identities
            .save(&identity)
            .await
            .map_err(|err| match err {
                IdentityRepositoryError::DuplicateEmail { .. } => {
                    Error::conflict("Email is already in use")
                }
                other => map_identity_error(other),
            })?;
        Ok(identity)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
