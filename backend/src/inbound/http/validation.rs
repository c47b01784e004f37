//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{
    CredentialValidationError, Error, EventId, IdentityFilter, Role, UserId, VerificationStatus,
};

/// Machine-readable detail codes attached to validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DetailCode {
    MissingField,
    InvalidUuid,
    InvalidEnum,
}

impl DetailCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidEnum => "invalid_enum",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: DetailCode, value: Option<&str>) -> Error {
    let details = match value {
        Some(value) => json!({ "field": field.as_str(), "value": value, "code": code.as_str() }),
        None => json!({ "field": field.as_str(), "code": code.as_str() }),
    };
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    field_error(
        field,
        format!("missing required field: {}", field.as_str()),
        DetailCode::MissingField,
        None,
    )
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    field_error(
        field,
        format!("{} must be a valid UUID", field.as_str()),
        DetailCode::InvalidUuid,
        Some(value),
    )
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_event_id(value: &str, field: FieldName) -> Result<EventId, Error> {
    EventId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Credential and signup failures keep their domain message.
pub(crate) fn credential_error(error: CredentialValidationError) -> Error {
    Error::invalid_request(error.to_string())
}

/// Build an identity filter from the optional `status` and `role` query values.
pub(crate) fn parse_identity_filter(
    status: Option<&str>,
    role: Option<&str>,
) -> Result<IdentityFilter, Error> {
    let status = status
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.parse::<VerificationStatus>().map_err(|_| {
                field_error(
                    FieldName::new("status"),
                    "status must be pending, approved, rejected or not_applicable".to_owned(),
                    DetailCode::InvalidEnum,
                    Some(raw),
                )
            })
        })
        .transpose()?;
    let role = role
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.parse::<Role>().map_err(|_| {
                field_error(
                    FieldName::new("role"),
                    "role must be user, admin or vendor".to_owned(),
                    DetailCode::InvalidEnum,
                    Some(raw),
                )
            })
        })
        .transpose()?;
    Ok(IdentityFilter { role, status })
}
