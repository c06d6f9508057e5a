//! Mailbox domain service: send, mailbox reads and single-message
//! mutations.
//!
//! Send runs validation, recipient resolution, the durable write, view
//! invalidation and finally the best-effort notification. Only the write is
//! authoritative; a notifier failure is reported in the outcome and logged,
//! never rolled back.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    MAILBOX_VIEW_PATH, MailNotifier, MailboxCommand, MailboxQuery, MailboxViewCache,
    MessagePersistenceError, MessageRepository, NotificationReceipt, SendOutcome,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Caller, ComposeDraft, EmailAddress, Error, Folder, MailNotification, MailboxEntry, Message,
    MessageId, NewMessage, NotificationOutcome, RecipientPolicy, TraceId, User,
};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            warn!(error = %message, "user store unavailable");
            Error::service_unavailable("mail service is temporarily unavailable")
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email during lookup: {email}"))
        }
    }
}

fn map_message_error(error: MessagePersistenceError) -> Error {
    match error {
        MessagePersistenceError::Connection { message } => {
            warn!(error = %message, "message store unavailable");
            Error::service_unavailable("mail service is temporarily unavailable")
        }
        MessagePersistenceError::Query { message } => {
            Error::internal(format!("message repository error: {message}"))
        }
    }
}

fn message_not_found(id: &MessageId) -> Error {
    Error::not_found(format!("message {id} not found"))
}

/// Sender identity and policy applied to outgoing mail.
#[derive(Debug, Clone)]
pub struct DeliverySettings {
    /// Recipient domain allow-list.
    pub policy: RecipientPolicy,
    /// Provider-facing `from` header, e.g. `Courier <mail@example.com>`.
    pub notify_from: String,
}

/// Sender header used when none is configured.
pub const DEFAULT_NOTIFY_FROM: &str = "Outlook Clone <email@mosespace.com>";

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            policy: RecipientPolicy::default(),
            notify_from: DEFAULT_NOTIFY_FROM.to_owned(),
        }
    }
}

/// Mailbox service implementing [`MailboxCommand`] and [`MailboxQuery`].
#[derive(Clone)]
pub struct MailboxService<U, M> {
    users: Arc<U>,
    messages: Arc<M>,
    notifier: Arc<dyn MailNotifier>,
    view_cache: Arc<dyn MailboxViewCache>,
    settings: DeliverySettings,
}

impl<U, M> MailboxService<U, M> {
    /// Create a new mailbox service.
    pub fn new(
        users: Arc<U>,
        messages: Arc<M>,
        notifier: Arc<dyn MailNotifier>,
        view_cache: Arc<dyn MailboxViewCache>,
        settings: DeliverySettings,
    ) -> Self {
        Self {
            users,
            messages,
            notifier,
            view_cache,
            settings,
        }
    }
}

impl<U, M> MailboxService<U, M>
where
    U: UserRepository,
    M: MessageRepository,
{
    /// Resolve every address to a registered user, preserving input order.
    ///
    /// Fails without side effects when any address is unknown, naming
    /// exactly the unresolved addresses.
    pub async fn resolve_recipients(&self, to: &[EmailAddress]) -> Result<Vec<User>, Error> {
        let mut found = self
            .users
            .find_by_emails(to)
            .await
            .map_err(map_user_error)?;

        let mut resolved = Vec::with_capacity(to.len());
        let mut unknown = Vec::new();
        for address in to {
            match found.iter().position(|user| user.email() == address) {
                Some(index) => resolved.push(found.swap_remove(index)),
                None => unknown.push(address.to_string()),
            }
        }

        if unknown.is_empty() {
            return Ok(resolved);
        }
        Err(Error::invalid_request(format!(
            "The following recipients are not registered: {}",
            unknown.join(", ")
        ))
        .with_details(json!({
            "field": "to",
            "code": "unknown_recipients",
            "addresses": unknown,
        })))
    }

    async fn notify(&self, message: &Message) -> NotificationOutcome {
        let mail = MailNotification::for_message(
            &self.settings.notify_from,
            &message.sender_email,
            &message.to,
            &message.subject,
            &message.content,
        );
        match self.notifier.send(&mail).await {
            Ok(NotificationReceipt::Accepted { provider_id }) => {
                info!(
                    message_id = %message.id,
                    provider_id = provider_id.as_deref().unwrap_or("-"),
                    recipients = message.to.len(),
                    "notification accepted"
                );
                NotificationOutcome::Sent
            }
            Ok(NotificationReceipt::Skipped) => NotificationOutcome::Disabled,
            Err(err) => {
                warn!(
                    message_id = %message.id,
                    trace_id = TraceId::current().map(|id| id.to_string()).as_deref(),
                    error = %err,
                    "notification failed; message stored without email copy"
                );
                NotificationOutcome::Failed
            }
        }
    }

    /// Ensure the message exists and `caller` takes part in it.
    async fn authorise(&self, caller: &Caller, id: &MessageId) -> Result<(), Error> {
        let participants = self
            .messages
            .find_participants(id)
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| message_not_found(id))?;
        if participants.includes(caller.email()) {
            Ok(())
        } else {
            Err(Error::forbidden("you are not a participant of this message"))
        }
    }

    async fn invalidate_view(&self) {
        self.view_cache.invalidate(MAILBOX_VIEW_PATH).await;
    }
}

#[async_trait]
impl<U, M> MailboxCommand for MailboxService<U, M>
where
    U: UserRepository,
    M: MessageRepository,
{
    async fn send(&self, caller: &Caller, draft: ComposeDraft) -> Result<SendOutcome, Error> {
        let validated = draft.validate(&self.settings.policy)?;
        let recipients = self.resolve_recipients(validated.to()).await?;
        let (_, subject, content) = validated.into_parts();

        let draft = NewMessage::compose(
            *caller.user_id(),
            caller.email().clone(),
            recipients,
            subject,
            content,
        );
        let message = self
            .messages
            .create(&draft)
            .await
            .map_err(map_message_error)?;
        self.invalidate_view().await;

        let notification = self.notify(&message).await;
        Ok(SendOutcome {
            message,
            notification,
        })
    }

    async fn mark_read(&self, caller: &Caller, id: &MessageId) -> Result<(), Error> {
        self.authorise(caller, id).await?;
        let updated = self
            .messages
            .mark_read(id)
            .await
            .map_err(map_message_error)?;
        if !updated {
            return Err(message_not_found(id));
        }
        self.invalidate_view().await;
        Ok(())
    }

    async fn toggle_pin(&self, caller: &Caller, id: &MessageId) -> Result<bool, Error> {
        self.authorise(caller, id).await?;
        let pinned = self
            .messages
            .toggle_pinned(id)
            .await
            .map_err(map_message_error)?
            .ok_or_else(|| message_not_found(id))?;
        self.invalidate_view().await;
        Ok(pinned)
    }

    async fn delete(&self, caller: &Caller, id: &MessageId) -> Result<(), Error> {
        self.authorise(caller, id).await?;
        let deleted = self
            .messages
            .delete(id)
            .await
            .map_err(map_message_error)?;
        if !deleted {
            return Err(message_not_found(id));
        }
        self.invalidate_view().await;
        Ok(())
    }
}

#[async_trait]
impl<U, M> MailboxQuery for MailboxService<U, M>
where
    U: UserRepository,
    M: MessageRepository,
{
    async fn list_mailbox(
        &self,
        caller: &Caller,
        folder: Folder,
    ) -> Result<Vec<MailboxEntry>, Error> {
        self.messages
            .list_for(caller.email(), folder)
            .await
            .map_err(|err| {
                warn!(error = %err, folder = %folder, "mailbox read failed");
                Error::service_unavailable("mailbox is temporarily unavailable")
            })
    }
}

#[cfg(test)]
#[path = "mailbox_service_tests.rs"]
mod tests;
