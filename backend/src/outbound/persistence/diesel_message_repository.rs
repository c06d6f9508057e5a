//! PostgreSQL-backed `MessageRepository` implementation using Diesel ORM.
//!
//! Messages keep their recipients twice: as `message_recipients` link rows
//! (relational integrity, cascade on delete) and as the denormalised
//! `to_addresses` array that mailbox reads filter on.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{MessagePersistenceError, MessageRepository};
use crate::domain::{
    EmailAddress, Folder, MailboxEntry, Message, MessageId, MessageParticipants, NewMessage,
    SenderProfile, TimeBucket, UserId,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{
    MessageRow, NewMessageRecipientRow, NewMessageRow, ParticipantsRow, SenderRow,
};
use super::pool::{DbPool, PoolError};
use super::schema::{message_recipients, messages, users};

/// Diesel-backed implementation of the message repository port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> MessagePersistenceError {
    map_basic_pool_error(error, MessagePersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> MessagePersistenceError {
    map_basic_diesel_error(
        error,
        MessagePersistenceError::query,
        MessagePersistenceError::connection,
    )
}

fn parse_address(raw: String, id: &uuid::Uuid) -> Result<EmailAddress, MessagePersistenceError> {
    EmailAddress::parse(&raw).map_err(|err| {
        MessagePersistenceError::query(format!("invalid address on message {id}: {err}"))
    })
}

/// Convert a database row into a domain message.
fn row_to_message(row: MessageRow) -> Result<Message, MessagePersistenceError> {
    let MessageRow {
        id,
        sender_id,
        sender_email,
        to_addresses,
        subject,
        content,
        preview,
        section,
        is_read,
        is_pinned,
        created_at,
    } = row;
    let section: TimeBucket = section.parse().map_err(|err| {
        MessagePersistenceError::query(format!("invalid section on message {id}: {err}"))
    })?;
    let to = to_addresses
        .into_iter()
        .map(|raw| parse_address(raw, &id))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Message {
        id: MessageId::from_uuid(id),
        sender_id: UserId::from_uuid(sender_id),
        sender_email: parse_address(sender_email, &id)?,
        to,
        subject,
        content,
        preview,
        section,
        read: is_read,
        pinned: is_pinned,
        created_at,
    })
}

fn row_to_entry(
    (message, sender): (MessageRow, SenderRow),
) -> Result<MailboxEntry, MessagePersistenceError> {
    let message = row_to_message(message)?;
    let email = parse_address(sender.email, message.id.as_uuid())?;
    Ok(MailboxEntry {
        message,
        sender: SenderProfile {
            display_name: sender.display_name,
            email,
            avatar_url: sender.avatar_url,
        },
    })
}

fn row_to_participants(row: ParticipantsRow) -> Result<MessageParticipants, MessagePersistenceError> {
    let ParticipantsRow {
        sender_email,
        to_addresses,
    } = row;
    let sender_email = EmailAddress::parse(&sender_email)
        .map_err(|err| MessagePersistenceError::query(format!("invalid sender address: {err}")))?;
    let recipients = to_addresses
        .iter()
        .map(EmailAddress::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| MessagePersistenceError::query(format!("invalid recipient address: {err}")))?;
    Ok(MessageParticipants {
        sender_email,
        recipients,
    })
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message, MessagePersistenceError> {
        let new_row = NewMessageRow {
            sender_id: *message.sender_id.as_uuid(),
            sender_email: message.sender_email.as_ref(),
            to_addresses: message
                .recipients
                .iter()
                .map(|user| user.email().to_string())
                .collect(),
            subject: &message.subject,
            content: &message.content,
            preview: &message.preview,
            section: message.section.as_str(),
        };
        let recipient_ids: Vec<uuid::Uuid> = message
            .recipients
            .iter()
            .map(|user| *user.id().as_uuid())
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = conn
            .transaction(|conn| {
                async move {
                    let row: MessageRow = diesel::insert_into(messages::table)
                        .values(&new_row)
                        .returning(MessageRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let links: Vec<NewMessageRecipientRow> = recipient_ids
                        .into_iter()
                        .map(|user_id| NewMessageRecipientRow {
                            message_id: row.id,
                            user_id,
                        })
                        .collect();
                    diesel::insert_into(message_recipients::table)
                        .values(&links)
                        .execute(conn)
                        .await?;

                    Ok(row)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        row_to_message(row)
    }

    async fn list_for(
        &self,
        email: &EmailAddress,
        folder: Folder,
    ) -> Result<Vec<MailboxEntry>, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let caller = email.to_string();
        let query = messages::table
            .inner_join(users::table)
            .select((MessageRow::as_select(), SenderRow::as_select()))
            .order((messages::created_at.desc(), messages::id.desc()))
            .into_boxed();
        let query = match folder {
            Folder::Sent => query.filter(messages::sender_email.eq(caller)),
            Folder::Inbox => query.filter(messages::to_addresses.contains(vec![caller])),
            Folder::All => query.filter(
                messages::sender_email
                    .eq(caller.clone())
                    .or(messages::to_addresses.contains(vec![caller])),
            ),
        };

        let rows: Vec<(MessageRow, SenderRow)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_entry).collect()
    }

    async fn find_participants(
        &self,
        id: &MessageId,
    ) -> Result<Option<MessageParticipants>, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = messages::table
            .find(*id.as_uuid())
            .select(ParticipantsRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_participants).transpose()
    }

    async fn mark_read(&self, id: &MessageId) -> Result<bool, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(messages::table.find(*id.as_uuid()))
            .set(messages::is_read.eq(true))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn toggle_pinned(&self, id: &MessageId) -> Result<Option<bool>, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(messages::table.find(*id.as_uuid()))
            .set(messages::is_pinned.eq(diesel::dsl::not(messages::is_pinned)))
            .returning(messages::is_pinned)
            .get_result::<bool>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, MessagePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(messages::table.find(*id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }
}
