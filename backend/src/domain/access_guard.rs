//! Bearer-token authentication for inbound adapters.

use std::sync::Arc;

use crate::domain::error_mapping::{map_identity_error, map_token_error, missing_token_error};
use crate::domain::ports::{IdentityRepository, TokenCodec};
use crate::domain::{Error, Identity, RoleRequirement, UserId, authorize};

/// Resolves bearer tokens to identities and applies role gates.
///
/// Read-only: tokens are never refreshed or rotated here.
#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<dyn TokenCodec>,
    identities: Arc<dyn IdentityRepository>,
}

impl AccessGuard {
    /// Create a guard over a token codec and the identity store.
    pub fn new(tokens: Arc<dyn TokenCodec>, identities: Arc<dyn IdentityRepository>) -> Self {
        Self { tokens, identities }
    }

    /// Verify `token` and load the identity it names.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, Error> {
        let token = token
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(missing_token_error)?;
        let subject = self.tokens.decode(token).map_err(map_token_error)?;
        self.identities
            .find_by_id(&subject)
            .await
            .map_err(map_identity_error)?
            .ok_or_else(|| Error::not_found("User not found"))
    }

    /// Authenticate and then require `requirement`.
    pub async fn authenticate_as(
        &self,
        token: Option<&str>,
        requirement: RoleRequirement,
    ) -> Result<Identity, Error> {
        let identity = self.authenticate(token).await?;
        authorize(&identity, requirement)?;
        Ok(identity)
    }

    /// Decode `token` without failing. Used where authentication is optional.
    #[must_use]
    pub fn identify(&self, token: Option<&str>) -> Option<UserId> {
        let token = token?;
        self.tokens.decode(token).map_err(map_token_error).ok()
    }
}
