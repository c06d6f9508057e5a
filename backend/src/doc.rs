//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler and the health checks, the
//! request and response bodies they use, the error envelope wrappers from
//! [`crate::inbound::http::schemas`] and the session cookie security scheme.
//!
//! Swagger UI serves it in debug builds; `cargo run --bin openapi-dump`
//! prints it for external tooling.

use crate::domain::{Folder, MailboxEntry, Message, NotificationOutcome, SenderProfile, TimeBucket, User};
use crate::inbound::http::messages::{
    PinResponse, ReadResponse, SendMessageRequest, SendMessageResponse,
};
use crate::inbound::http::password::{ForgotPasswordRequest, ResetPasswordRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/login or /api/v1/register.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Courier API",
        description = "Message delivery and mailbox queries for registered users."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::change_password,
        crate::inbound::http::password::forgot_password,
        crate::inbound::http::password::reset_password,
        crate::inbound::http::messages::send_message,
        crate::inbound::http::messages::list_messages,
        crate::inbound::http::messages::mark_read,
        crate::inbound::http::messages::toggle_pin,
        crate::inbound::http::messages::delete_message,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Message,
        MailboxEntry,
        SenderProfile,
        Folder,
        TimeBucket,
        NotificationOutcome,
        RegisterRequest,
        LoginRequest,
        ChangePasswordRequest,
        ForgotPasswordRequest,
        ResetPasswordRequest,
        SendMessageRequest,
        SendMessageResponse,
        ReadResponse,
        PinResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "users", description = "Registration, login and the current account"),
        (name = "password", description = "Resetting a forgotten password by email"),
        (name = "messages", description = "Sending, listing and updating messages"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Structure checks on the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_uses_the_envelope_field_names() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get(ERROR_SCHEMA_NAME).expect("Error schema"));
        for field in ["code", "message", "traceId", "details"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    fn message_schema_is_camel_case() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get("Message").expect("Message schema"));
        for field in ["id", "senderEmail", "to", "preview", "section", "pinned", "createdAt"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/messages")]
    #[case("/api/v1/messages/{id}/pin")]
    #[case("/api/v1/register")]
    #[case("/api/v1/password/reset")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }
}
