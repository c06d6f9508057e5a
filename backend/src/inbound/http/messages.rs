//! Mailbox API handlers.
//!
//! ```text
//! POST   /api/v1/messages {"to":["grace@outlook.com"],"subject":"Hi","content":"<p>Hello</p>"}
//! GET    /api/v1/messages?folder=inbox|sent|all
//! POST   /api/v1/messages/{id}/read
//! POST   /api/v1/messages/{id}/pin
//! DELETE /api/v1/messages/{id}
//! ```

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ApiResult, ComposeDraft, MailboxEntry, Message, NotificationOutcome};
use crate::inbound::http::cache_control::{is_not_modified, mailbox_etag, private_no_cache_header};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_folder, parse_message_id};

/// Body for `POST /api/v1/messages`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[schema(example = json!(["grace@outlook.com"]))]
    pub to: Vec<String>,
    #[schema(example = "Lunch?")]
    pub subject: String,
    #[schema(example = "<p>Are you free at noon?</p>")]
    pub content: String,
}

impl From<SendMessageRequest> for ComposeDraft {
    fn from(value: SendMessageRequest) -> Self {
        Self {
            to: value.to,
            subject: value.subject,
            content: value.content,
        }
    }
}

/// Response for a stored message and how its email copy fared.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub message: Message,
    pub notification: NotificationOutcome,
}

/// Query string for `GET /api/v1/messages`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MailboxParams {
    /// `inbox` (default), `sent` or `all`.
    pub folder: Option<String>,
}

/// Response for `POST /api/v1/messages/{id}/read`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    #[schema(value_type = String)]
    pub id: String,
    pub read: bool,
}

/// Response for `POST /api/v1/messages/{id}/pin`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PinResponse {
    #[schema(value_type = String)]
    pub id: String,
    pub pinned: bool,
}

/// Validate, store and notify.
///
/// The response is `201` once the message is stored; a failed email copy is
/// reported as `notification: "failed"` rather than an error.
#[utoipa::path(
    post,
    path = "/api/v1/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = SendMessageResponse),
        (status = 400, description = "Invalid, disallowed or unknown recipients", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Message storage unavailable", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "sendMessage"
)]
#[post("/messages")]
pub async fn send_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SendMessageRequest>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let outcome = state
        .mailbox
        .send(&caller, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(SendMessageResponse {
        message: outcome.message,
        notification: outcome.notification,
    }))
}

/// Messages visible to the caller in a folder, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/messages",
    params(MailboxParams),
    responses(
        (status = 200, description = "Mailbox entries", body = [MailboxEntry],
            headers(("ETag" = String), ("Cache-Control" = String))),
        (status = 304, description = "Mailbox unchanged since the supplied ETag"),
        (status = 400, description = "Unknown folder", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Mailbox unavailable", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "listMessages"
)]
#[get("/messages")]
pub async fn list_messages(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    params: web::Query<MailboxParams>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let folder = parse_folder(params.folder.as_deref())?;
    let entries = state.mailbox_query.list_mailbox(&caller, folder).await?;
    let etag = mailbox_etag(caller.email(), folder, &entries);

    if is_not_modified(&req, &etag) {
        return Ok(HttpResponse::NotModified()
            .insert_header(private_no_cache_header())
            .insert_header(header::ETag(etag))
            .finish());
    }

    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache_header())
        .insert_header(header::ETag(etag))
        .json(entries))
}

/// Mark a message read. Repeating the call is harmless.
#[utoipa::path(
    post,
    path = "/api/v1/messages/{id}/read",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message marked read", body = ReadResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a participant", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "markMessageRead"
)]
#[post("/messages/{id}/read")]
pub async fn mark_read(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<ReadResponse>> {
    let caller = session.require_caller()?;
    let id = parse_message_id(&path)?;
    state.mailbox.mark_read(&caller, &id).await?;
    Ok(web::Json(ReadResponse {
        id: id.to_string(),
        read: true,
    }))
}

/// Flip the pinned flag and return its new value.
#[utoipa::path(
    post,
    path = "/api/v1/messages/{id}/pin",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Pinned flag toggled", body = PinResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a participant", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "toggleMessagePin"
)]
#[post("/messages/{id}/pin")]
pub async fn toggle_pin(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<PinResponse>> {
    let caller = session.require_caller()?;
    let id = parse_message_id(&path)?;
    let pinned = state.mailbox.toggle_pin(&caller, &id).await?;
    Ok(web::Json(PinResponse {
        id: id.to_string(),
        pinned,
    }))
}

/// Delete a message for every participant.
#[utoipa::path(
    delete,
    path = "/api/v1/messages/{id}",
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Caller is not a participant", body = ErrorSchema),
        (status = 404, description = "Message not found", body = ErrorSchema)
    ),
    tags = ["messages"],
    operation_id = "deleteMessage"
)]
#[delete("/messages/{id}")]
pub async fn delete_message(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.require_caller()?;
    let id = parse_message_id(&path)?;
    state.mailbox.delete(&caller, &id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
