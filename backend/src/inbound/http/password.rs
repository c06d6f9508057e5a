//! Password reset API handlers.
//!
//! ```text
//! POST /api/v1/password/forgot {"email":"ada@gmail.com"}
//! POST /api/v1/password/reset {"email":"ada@gmail.com","token":"…","password":"…"}
//! ```
//!
//! Both endpoints are public. A forgot request answers `202` whether or not
//! the address has an account.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, CredentialValidationError, EmailAddress, PasswordReset};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::credential_error;

/// Body for `POST /api/v1/password/forgot`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    #[schema(example = "ada@gmail.com")]
    pub email: String,
}

/// Body for `POST /api/v1/password/reset`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    #[schema(example = "ada@gmail.com")]
    pub email: String,
    /// Token from the emailed link.
    pub token: String,
    pub password: String,
}

/// Email a single-use reset link to the address, if it has an account.
#[utoipa::path(
    post,
    path = "/api/v1/password/forgot",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 202, description = "Reset instructions sent when the account exists"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Reset email or storage unavailable", body = ErrorSchema)
    ),
    tags = ["password"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/password/forgot")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    payload: web::Json<ForgotPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let ForgotPasswordRequest { email } = payload.into_inner();
    let email = EmailAddress::parse(&email)
        .map_err(CredentialValidationError::InvalidEmail)
        .map_err(credential_error)?;
    state.password_reset.request_reset(&email).await?;
    Ok(HttpResponse::Accepted().finish())
}

/// Redeem a reset token and replace the account password.
#[utoipa::path(
    post,
    path = "/api/v1/password/reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 204, description = "Password replaced"),
        (status = 400, description = "Invalid request, or invalid or expired token", body = ErrorSchema),
        (status = 503, description = "Account storage unavailable", body = ErrorSchema)
    ),
    tags = ["password"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/password/reset")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    payload: web::Json<ResetPasswordRequest>,
) -> ApiResult<HttpResponse> {
    let ResetPasswordRequest {
        email,
        token,
        password,
    } = payload.into_inner();
    let reset =
        PasswordReset::try_from_parts(&email, &token, &password).map_err(credential_error)?;
    state.password_reset.reset_password(&reset).await?;
    Ok(HttpResponse::NoContent().finish())
}
