//! OpenAPI schema wrappers for types that do not derive `ToSchema`.
//!
//! The domain [`Error`](crate::domain::Error) serialises through a private
//! DTO, so its documented shape lives here in the inbound layer.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not a participant of the resource.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request conflicts with existing state, such as a taken email.
    #[schema(rename = "conflict")]
    Conflict,
    /// A backing store is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[schema(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(
        example = "Invalid email addresses: x@yahoo.com. Only gmail.com and outlook.com addresses are accepted."
    )]
    message: String,
    /// Correlation identifier, echoed in the `Trace-Id` header.
    #[schema(example = "7c0c4d8e-3f7a-4f39-9f0e-5b8a1d2e3c4f")]
    trace_id: Option<String>,
    /// Field-level context such as `{field, code, addresses}`.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    #[test]
    fn error_schema_uses_camel_case_trace_id() {
        match ErrorSchema::schema() {
            RefOr::T(Schema::Object(obj)) => {
                assert!(obj.properties.contains_key("traceId"));
                assert!(obj.properties.contains_key("code"));
                assert!(!obj.properties.contains_key("trace_id"));
            }
            _ => panic!("expected object schema"),
        }
    }

    #[test]
    fn error_code_schema_lists_every_code() {
        let json = serde_json::to_string(&ErrorCodeSchema::schema()).expect("schema json");
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        for code in [
            "invalid_request",
            "unauthorized",
            "forbidden",
            "not_found",
            "conflict",
            "service_unavailable",
            "internal_error",
        ] {
            assert!(json.contains(code), "missing {code}");
        }
    }
}
