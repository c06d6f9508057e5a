//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{message_recipients, messages, password_reset_tokens, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// User row including the credential hash, for authentication paths only.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserCredentialsRow {
    #[diesel(embed)]
    pub user: UserRow,
    pub password_hash: Option<String>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub avatar_url: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

/// Sender projection joined onto mailbox reads.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SenderRow {
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// Row struct for reading from the messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessageRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_email: String,
    pub to_addresses: Vec<String>,
    pub subject: String,
    pub content: String,
    pub preview: String,
    pub section: String,
    pub is_read: bool,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for new messages; id and timestamp come from column
/// defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub(crate) struct NewMessageRow<'a> {
    pub sender_id: Uuid,
    pub sender_email: &'a str,
    pub to_addresses: Vec<String>,
    pub subject: &'a str,
    pub content: &'a str,
    pub preview: &'a str,
    pub section: &'a str,
}

/// Link between a message and one recipient.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = message_recipients)]
pub(crate) struct NewMessageRecipientRow {
    pub message_id: Uuid,
    pub user_id: Uuid,
}

/// Columns needed to authorise a mutation.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ParticipantsRow {
    pub sender_email: String,
    pub to_addresses: Vec<String>,
}

/// Insertable reset token; `created_at` comes from the column default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = password_reset_tokens)]
pub(crate) struct NewResetTokenRow<'a> {
    pub user_id: Uuid,
    pub token_hash: &'a str,
    pub expires_at: DateTime<Utc>,
}
