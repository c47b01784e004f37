//! Authentication primitives such as credentials and password changes.
//!
//! Inbound adapters hand raw strings to these constructors so handlers never
//! talk to a port with unchecked input. Secrets are held in [`Zeroizing`]
//! buffers and wiped on drop.

use zeroize::Zeroizing;

use crate::domain::{Age, Email, FullName, IdentityValidationError};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when authentication payloads are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// One or more required fields were blank.
    #[error("All fields are required")]
    MissingFields,
    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,
    /// New password and confirmation differ during a change.
    #[error("New passwords do not match")]
    NewPasswordMismatch,
    /// Password shorter than [`PASSWORD_MIN`].
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// An identity attribute failed validation.
    #[error(transparent)]
    Identity(#[from] IdentityValidationError),
}

/// Caller-supplied secret.
///
/// Surrounding whitespace is preserved so comparisons match what the caller
/// typed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a secret, rejecting the empty string.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        if raw.is_empty() {
            return Err(CredentialValidationError::MissingFields);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Wrap a secret chosen as a new password, enforcing the length floor.
    pub fn new_secret(raw: &str) -> Result<Self, CredentialValidationError> {
        let password = Self::new(raw)?;
        if raw.chars().count() < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(password)
    }

    /// Expose the secret for hashing or verification.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(..)")
    }
}

fn confirmed(
    password: &str,
    confirmation: &str,
    mismatch: CredentialValidationError,
) -> Result<Password, CredentialValidationError> {
    if password != confirmation {
        return Err(mismatch);
    }
    Password::new_secret(password)
}

/// Validated login credentials.
///
/// # Examples
/// ```
/// use nightlist::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" A@X.com ", "hunter22").unwrap();
/// assert_eq!(creds.email().as_ref(), "a@x.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        if email.trim().is_empty() {
            return Err(CredentialValidationError::MissingFields);
        }
        Ok(Self {
            email: Email::new(email)?,
            password: Password::new(password)?,
        })
    }

    /// Normalised login email.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Caller-provided password.
    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Raw signup form fields.
#[derive(Debug, Clone, Copy)]
pub struct SignupParts<'a> {
    /// Display name.
    pub full_name: &'a str,
    /// Login email.
    pub email: &'a str,
    /// Chosen password.
    pub password: &'a str,
    /// Password confirmation.
    pub confirm_password: &'a str,
    /// Age in years.
    pub age: i64,
}

/// Validated self-service registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    full_name: FullName,
    email: Email,
    password: Password,
    age: Age,
}

impl SignupRequest {
    /// Validate a signup form. The confirmation check runs first.
    pub fn try_from_parts(parts: SignupParts<'_>) -> Result<Self, CredentialValidationError> {
        let password = confirmed(
            parts.password,
            parts.confirm_password,
            CredentialValidationError::PasswordMismatch,
        )?;
        Ok(Self {
            full_name: FullName::new(parts.full_name)?,
            email: Email::new(parts.email)?,
            password,
            age: Age::new(parts.age)?,
        })
    }

    /// Display name.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Login email.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Chosen password.
    #[must_use]
    pub fn password(&self) -> &Password {
        &self.password
    }

    /// Age in years.
    #[must_use]
    pub fn age(&self) -> Age {
        self.age
    }
}

/// Validated password change for an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Password,
    new_password: Password,
}

impl PasswordChange {
    /// Validate the three change-password fields.
    pub fn try_from_parts(
        current: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Self, CredentialValidationError> {
        if current.is_empty() || new_password.is_empty() || confirm_password.is_empty() {
            return Err(CredentialValidationError::MissingFields);
        }
        Ok(Self {
            current: Password::new(current)?,
            new_password: confirmed(
                new_password,
                confirm_password,
                CredentialValidationError::NewPasswordMismatch,
            )?,
        })
    }

    /// Password the caller claims is current.
    #[must_use]
    pub fn current(&self) -> &Password {
        &self.current
    }

    /// Replacement password.
    #[must_use]
    pub fn new_password(&self) -> &Password {
        &self.new_password
    }
}

/// Validated redemption of an emailed reset code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetRequest {
    email: Email,
    code: String,
    new_password: Password,
}

impl PasswordResetRequest {
    /// Validate reset form fields. The confirmation check runs first.
    pub fn try_from_parts(
        email: &str,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let new_password = confirmed(
            new_password,
            confirm_password,
            CredentialValidationError::PasswordMismatch,
        )?;
        Ok(Self {
            email: Email::new(email)?,
            code: code.trim().to_owned(),
            new_password,
        })
    }

    /// Account email.
    #[must_use]
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Code as typed by the caller.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Replacement password.
    #[must_use]
    pub fn new_password(&self) -> &Password {
        &self.new_password
    }
}
