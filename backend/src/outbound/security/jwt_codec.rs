//! HS256 JSON Web Token adapter for the token codec port.
//!
//! Claims are `{ sub, iat, exp }` with `sub` holding the identity UUID.
//! Expiry is checked against wall-clock time with zero leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::UserId;
use crate::domain::ports::{IssuedToken, TOKEN_TTL_SECONDS, TokenCodec, TokenCodecError};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies bearer tokens with a shared secret.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    /// Build a codec from raw secret bytes.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl std::fmt::Debug for JwtTokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec for JwtTokenCodec {
    fn issue(&self, subject: &UserId, now: DateTime<Utc>) -> Result<IssuedToken, TokenCodecError> {
        let expires_at = now + Duration::seconds(TOKEN_TTL_SECONDS);
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| TokenCodecError::encode(err.to_string()))?;
        Ok(IssuedToken { token, expires_at })
    }

    fn decode(&self, token: &str) -> Result<UserId, TokenCodecError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            debug!(kind = ?err.kind(), "token rejected");
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenCodecError::expired(),
                _ => TokenCodecError::invalid(err.to_string()),
            }
        })?;
        UserId::new(&data.claims.sub)
            .map_err(|_| TokenCodecError::invalid("subject is not an identity id"))
    }
}
