//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed mail entities used by the API and
//! persistence layers, plus the services that implement the driving ports.
//! Keep types immutable and document invariants and serialisation contracts
//! (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - EmailAddress: normalised identity key.
//! - User, Caller: registered accounts and the authenticated identity.
//! - Message, Folder, TimeBucket, MailboxEntry: stored mail and its views.
//! - ComposeDraft, RecipientPolicy: compose validation.
//! - ResetToken, ResetSettings, PasswordReset: password reset by email.
//! - MailboxService, AccountService, PasswordResetService: driving port
//!   implementations.

pub mod account_service;
pub mod auth;
pub mod compose;
pub mod email_address;
pub mod error;
pub mod mailbox_service;
pub mod message;
pub mod notification;
pub mod password_reset;
pub mod password_reset_service;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    Caller, CredentialValidationError, LoginCredentials, PASSWORD_MIN_LENGTH, PasswordChange,
    PasswordReset, RegistrationDraft,
};
pub use self::compose::{
    ComposeDraft, ComposeValidationError, DEFAULT_ALLOWED_DOMAINS, RecipientPolicy,
    ValidatedCompose,
};
pub use self::email_address::{EmailAddress, EmailAddressError};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::mailbox_service::{DEFAULT_NOTIFY_FROM, DeliverySettings, MailboxService};
pub use self::message::{
    Folder, MailboxEntry, Message, MessageId, MessageParticipants, NewMessage, SenderProfile,
    TimeBucket, UnknownFolder, UnknownTimeBucket, preview_of,
};
pub use self::notification::{
    MailNotification, NotificationOutcome, RESET_SUBJECT, render_html, render_reset_html,
};
pub use self::password_reset::{
    DEFAULT_RESET_LINK_BASE, DEFAULT_RESET_TOKEN_TTL_MINUTES, ResetSettings, ResetToken,
    token_digest,
};
pub use self::password_reset_service::PasswordResetService;
pub use self::trace_id::TraceId;
pub use self::user::{DisplayName, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use courier::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
