//! Message model, mailbox folders and the derived fields computed at send
//! time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::email_address::EmailAddress;
use super::user::{User, UserId};

/// Number of body characters copied into a preview.
pub const PREVIEW_CHARS: usize = 100;
/// Marker appended to every preview.
pub const PREVIEW_MARKER: &str = "...";

/// Derive the preview stored alongside a message body.
///
/// The marker is appended unconditionally, so short bodies still end in
/// `...`. Counting is by `char`, never splitting a code point.
///
/// # Examples
/// ```
/// use courier::domain::preview_of;
///
/// assert_eq!(preview_of("hello"), "hello...");
/// assert_eq!(preview_of(&"x".repeat(150)).len(), 103);
/// ```
pub fn preview_of(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    preview.push_str(PREVIEW_MARKER);
    preview
}

/// Stable message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named partition of the message set relative to a caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    /// Messages where the caller is a recipient.
    #[default]
    Inbox,
    /// Messages the caller sent.
    Sent,
    /// Union of inbox and sent.
    All,
}

impl Folder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Sent => "sent",
            Self::All => "all",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a folder name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown folder `{0}`; expected inbox, sent or all")]
pub struct UnknownFolder(pub String);

impl FromStr for Folder {
    type Err = UnknownFolder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "sent" => Ok(Self::Sent),
            "all" => Ok(Self::All),
            _ => Err(UnknownFolder(s.to_owned())),
        }
    }
}

/// Coarse UI grouping label stored with each message.
///
/// The label is fixed when the message is created and never recomputed, so
/// a message sent last week still reads `Today`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum TimeBucket {
    #[default]
    Today,
    Yesterday,
    Earlier,
}

impl TimeBucket {
    /// Label assigned to newly created messages.
    pub const fn at_creation() -> Self {
        Self::Today
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::Earlier => "Earlier",
        }
    }
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored section label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown time bucket `{0}`")]
pub struct UnknownTimeBucket(pub String);

impl FromStr for TimeBucket {
    type Err = UnknownTimeBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Today" => Ok(Self::Today),
            "Yesterday" => Ok(Self::Yesterday),
            "Earlier" => Ok(Self::Earlier),
            other => Err(UnknownTimeBucket(other.to_owned())),
        }
    }
}

/// Write model handed to the message store.
///
/// `recipients` are already resolved users; the store links each of them
/// and keeps their addresses, in order, as the denormalised `to` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub sender_email: EmailAddress,
    pub recipients: Vec<User>,
    pub subject: String,
    pub content: String,
    pub preview: String,
    pub section: TimeBucket,
}

impl NewMessage {
    /// Assemble a write model, deriving preview and section.
    pub fn compose(
        sender_id: UserId,
        sender_email: EmailAddress,
        recipients: Vec<User>,
        subject: String,
        content: String,
    ) -> Self {
        let preview = preview_of(&content);
        Self {
            sender_id,
            sender_email,
            recipients,
            subject,
            content,
            preview,
            section: TimeBucket::at_creation(),
        }
    }
}

/// Stored message.
///
/// ## Invariants
/// - `to` is non-empty and fixed at creation.
/// - `preview == preview_of(content)`.
/// - `read` and `pinned` change independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[schema(value_type = String, example = "6f1c6c1e-5c38-4f63-9a55-1d8f3ad0d1b2")]
    pub id: MessageId,
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub sender_id: UserId,
    #[schema(value_type = String, example = "ada@gmail.com")]
    pub sender_email: EmailAddress,
    #[schema(value_type = Vec<String>, example = json!(["grace@outlook.com"]))]
    pub to: Vec<EmailAddress>,
    pub subject: String,
    pub content: String,
    pub preview: String,
    pub section: TimeBucket,
    pub read: bool,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether `email` is the sender or one of the recipients.
    pub fn involves(&self, email: &EmailAddress) -> bool {
        self.sender_email == *email || self.to.contains(email)
    }
}

/// Read-only projection of the sender shown next to each mailbox entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SenderProfile {
    pub display_name: String,
    #[schema(value_type = String)]
    pub email: EmailAddress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl From<&User> for SenderProfile {
    fn from(user: &User) -> Self {
        Self {
            display_name: user.display_name().to_string(),
            email: user.email().clone(),
            avatar_url: user.avatar_url().map(str::to_owned),
        }
    }
}

/// Message joined with its sender projection, as returned by mailbox reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MailboxEntry {
    #[serde(flatten)]
    pub message: Message,
    pub sender: SenderProfile,
}

/// Participants of a message, used for row-level authorisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageParticipants {
    pub sender_email: EmailAddress,
    pub recipients: Vec<EmailAddress>,
}

impl MessageParticipants {
    pub fn includes(&self, email: &EmailAddress) -> bool {
        self.sender_email == *email || self.recipients.contains(email)
    }
}
