//! Driving port for sending messages and mutating single messages.

use async_trait::async_trait;

use crate::domain::{Caller, ComposeDraft, Error, Message, MessageId, NotificationOutcome};

/// Result of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub message: Message,
    pub notification: NotificationOutcome,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailboxCommand: Send + Sync {
    /// Validate, resolve recipients, store, then notify.
    async fn send(&self, caller: &Caller, draft: ComposeDraft) -> Result<SendOutcome, Error>;

    /// Set the read flag. Repeating the call is a no-op.
    async fn mark_read(&self, caller: &Caller, id: &MessageId) -> Result<(), Error>;

    /// Flip the pinned flag and return the new value.
    async fn toggle_pin(&self, caller: &Caller, id: &MessageId) -> Result<bool, Error>;

    /// Remove the message from every mailbox.
    async fn delete(&self, caller: &Caller, id: &MessageId) -> Result<(), Error>;
}

/// Command port used when no database is configured.
///
/// Sends are refused and every id is unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailboxCommand;

fn missing(id: &MessageId) -> Error {
    Error::not_found(format!("message {id} not found"))
}

#[async_trait]
impl MailboxCommand for FixtureMailboxCommand {
    async fn send(&self, _caller: &Caller, _draft: ComposeDraft) -> Result<SendOutcome, Error> {
        Err(Error::service_unavailable("message storage is not configured"))
    }

    async fn mark_read(&self, _caller: &Caller, id: &MessageId) -> Result<(), Error> {
        Err(missing(id))
    }

    async fn toggle_pin(&self, _caller: &Caller, id: &MessageId) -> Result<bool, Error> {
        Err(missing(id))
    }

    async fn delete(&self, _caller: &Caller, id: &MessageId) -> Result<(), Error> {
        Err(missing(id))
    }
}
