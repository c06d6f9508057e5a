//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper returns an `invalid_request` error whose details name the
//! offending `field` and a stable `code`.

use serde_json::json;
use uuid::Uuid;

use crate::domain::{CredentialValidationError, Error, Folder, MessageId};

/// Stable detail codes for request-shape failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldErrorCode {
    InvalidUuid,
    UnknownFolder,
    InvalidEmail,
    EmptyPassword,
    PasswordTooShort,
    InvalidName,
    EmptyToken,
}

impl FieldErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::InvalidUuid => "invalid_uuid",
            Self::UnknownFolder => "unknown_folder",
            Self::InvalidEmail => "invalid_email",
            Self::EmptyPassword => "empty_password",
            Self::PasswordTooShort => "password_too_short",
            Self::InvalidName => "invalid_name",
            Self::EmptyToken => "empty_token",
        }
    }
}

fn field_error(field: &str, code: FieldErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Parse the `{id}` path segment of message routes.
pub(crate) fn parse_message_id(raw: &str) -> Result<MessageId, Error> {
    Uuid::parse_str(raw)
        .map(MessageId::from_uuid)
        .map_err(|_| {
            Error::invalid_request("id must be a valid UUID").with_details(json!({
                "field": "id",
                "value": raw,
                "code": FieldErrorCode::InvalidUuid.as_str(),
            }))
        })
}

/// Parse the optional `folder` query parameter, defaulting to the inbox.
pub(crate) fn parse_folder(raw: Option<&str>) -> Result<Folder, Error> {
    match raw {
        None => Ok(Folder::default()),
        Some(value) => value.parse().map_err(|_| {
            field_error(
                "folder",
                FieldErrorCode::UnknownFolder,
                format!("unknown folder '{value}'; expected inbox, sent or all"),
            )
        }),
    }
}

/// Map credential payload failures onto field-level errors.
pub(crate) fn credential_error(err: CredentialValidationError) -> Error {
    let code = match &err {
        CredentialValidationError::InvalidEmail(_) => FieldErrorCode::InvalidEmail,
        CredentialValidationError::EmptyPassword => FieldErrorCode::EmptyPassword,
        CredentialValidationError::PasswordTooShort { .. } => FieldErrorCode::PasswordTooShort,
        CredentialValidationError::InvalidName(_) => FieldErrorCode::InvalidName,
        CredentialValidationError::EmptyToken => FieldErrorCode::EmptyToken,
    };
    field_error(err.field(), code, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn message_id_accepts_uuid() {
        let id = parse_message_id("6f1c6c1e-5c38-4f63-9a55-1d8f3ad0d1b2").expect("uuid");
        assert_eq!(id.to_string(), "6f1c6c1e-5c38-4f63-9a55-1d8f3ad0d1b2");
    }

    #[rstest]
    fn message_id_rejects_garbage_with_value_detail() {
        let err = parse_message_id("42").expect_err("not a uuid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "id");
        assert_eq!(details["value"], "42");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    #[case(None, Folder::Inbox)]
    #[case(Some("sent"), Folder::Sent)]
    #[case(Some("ALL"), Folder::All)]
    fn folder_parses_or_defaults(#[case] raw: Option<&str>, #[case] expected: Folder) {
        assert_eq!(parse_folder(raw).expect("folder"), expected);
    }

    #[rstest]
    fn unknown_folder_is_rejected() {
        let err = parse_folder(Some("drafts")).expect_err("unknown");
        assert_eq!(err.details().expect("details")["code"], "unknown_folder");
    }

    #[rstest]
    #[case(CredentialValidationError::EmptyPassword, "password", "empty_password")]
    #[case(
        CredentialValidationError::PasswordTooShort { min: 8 },
        "password",
        "password_too_short"
    )]
    #[case(CredentialValidationError::EmptyToken, "token", "empty_token")]
    fn credential_errors_name_the_field(
        #[case] err: CredentialValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mapped = credential_error(err);
        let details = mapped.details().expect("details");
        assert_eq!(details["field"], field);
        assert_eq!(details["code"], code);
    }
}
