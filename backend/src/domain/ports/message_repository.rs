//! Port for message persistence: creation, mailbox reads and single-row
//! mutations.

use async_trait::async_trait;

use crate::domain::{
    EmailAddress, Folder, MailboxEntry, Message, MessageId, MessageParticipants, NewMessage,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessagePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "message repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Persist the message and one recipient link per resolved user
    /// atomically. The store assigns the id and creation timestamp.
    async fn create(&self, message: &NewMessage) -> Result<Message, MessagePersistenceError>;

    /// Messages visible to `email` in `folder`, newest first, joined with
    /// the sender projection.
    async fn list_for(
        &self,
        email: &EmailAddress,
        folder: Folder,
    ) -> Result<Vec<MailboxEntry>, MessagePersistenceError>;

    /// Sender and recipient addresses of a message, if it exists.
    async fn find_participants(
        &self,
        id: &MessageId,
    ) -> Result<Option<MessageParticipants>, MessagePersistenceError>;

    /// Set the read flag. Returns `false` when no row matched.
    async fn mark_read(&self, id: &MessageId) -> Result<bool, MessagePersistenceError>;

    /// Flip the pinned flag in a single statement and return the new value,
    /// or `None` when no row matched.
    async fn toggle_pinned(&self, id: &MessageId) -> Result<Option<bool>, MessagePersistenceError>;

    /// Hard delete. Returns `false` when no row matched.
    async fn delete(&self, id: &MessageId) -> Result<bool, MessagePersistenceError>;
}
