//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, reset token storage, the mail notifier, the
//! view cache, the credential hasher) expose strongly typed errors so
//! adapters map their failures into predictable variants. Driving ports
//! return the domain [`Error`](crate::domain::Error) and are what inbound
//! adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod credential_hasher;
mod fixtures;
mod login_service;
mod mail_notifier;
mod mailbox_command;
mod mailbox_query;
mod mailbox_view_cache;
mod message_repository;
mod password_reset_command;
mod password_reset_repository;
mod user_profile_query;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, FixtureAccountCommand};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{FixtureLoginService, LoginService};
#[cfg(test)]
pub use mail_notifier::MockMailNotifier;
pub use mail_notifier::{
    FixtureMailNotifier, MailNotifier, MailNotifierError, NotificationReceipt,
};
#[cfg(test)]
pub use mailbox_command::MockMailboxCommand;
pub use mailbox_command::{FixtureMailboxCommand, MailboxCommand, SendOutcome};
#[cfg(test)]
pub use mailbox_query::MockMailboxQuery;
pub use mailbox_query::{FixtureMailboxQuery, MailboxQuery};
#[cfg(test)]
pub use mailbox_view_cache::MockMailboxViewCache;
pub use mailbox_view_cache::{FixtureMailboxViewCache, MAILBOX_VIEW_PATH, MailboxViewCache};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessagePersistenceError, MessageRepository};
#[cfg(test)]
pub use password_reset_command::MockPasswordResetCommand;
pub use password_reset_command::{FixturePasswordResetCommand, PasswordResetCommand};
#[cfg(test)]
pub use password_reset_repository::MockPasswordResetRepository;
pub use password_reset_repository::{
    PasswordResetPersistenceError, PasswordResetRepository, ResetTokenRecord,
};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::{FixtureUserProfileQuery, UserProfileQuery};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentials, UserPersistenceError, UserRepository};
