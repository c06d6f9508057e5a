//! In-memory port doubles shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and behind the `test-support` feature so the
//! `tests/` suites can drive the real domain services without PostgreSQL or
//! a mail provider.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{
    CredentialHasher, CredentialHasherError, MailNotifier, MailNotifierError,
    MessagePersistenceError, MessageRepository, NotificationReceipt,
    PasswordResetPersistenceError, PasswordResetRepository, ResetTokenRecord, UserCredentials,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountService, DeliverySettings, EmailAddress, Folder, MailNotification, MailboxEntry,
    MailboxService, Message, MessageId, MessageParticipants, NewMessage, PasswordResetService,
    ResetSettings, SenderProfile, User, UserId,
};
use crate::inbound::http::state::HttpStatePorts;
use crate::outbound::cache::InMemoryMailboxViewCache;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// User store keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    records: Mutex<HashMap<UserId, UserCredentials>>,
    unavailable: Mutex<bool>,
}

impl InMemoryUserRepository {
    /// Insert a record directly, e.g. an account without a password hash.
    pub fn insert(&self, record: UserCredentials) {
        lock(&self.records).insert(*record.user.id(), record);
    }

    /// Make every later call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock(&self.unavailable) = unavailable;
    }

    fn check(&self) -> Result<(), UserPersistenceError> {
        if *lock(&self.unavailable) {
            return Err(UserPersistenceError::connection("user store offline"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, record: &UserCredentials) -> Result<(), UserPersistenceError> {
        self.check()?;
        let mut records = lock(&self.records);
        if records
            .values()
            .any(|existing| existing.user.email() == record.user.email())
        {
            return Err(UserPersistenceError::duplicate_email(
                record.user.email().as_ref(),
            ));
        }
        records.insert(*record.user.id(), record.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        self.check()?;
        Ok(lock(&self.records).get(id).map(|record| record.user.clone()))
    }

    async fn find_by_emails(
        &self,
        emails: &[EmailAddress],
    ) -> Result<Vec<User>, UserPersistenceError> {
        self.check()?;
        Ok(lock(&self.records)
            .values()
            .filter(|record| emails.contains(record.user.email()))
            .map(|record| record.user.clone())
            .collect())
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        self.check()?;
        Ok(lock(&self.records)
            .values()
            .find(|record| record.user.email() == email)
            .cloned())
    }

    async fn find_credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        self.check()?;
        Ok(lock(&self.records).get(id).cloned())
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserPersistenceError> {
        self.check()?;
        Ok(match lock(&self.records).get_mut(id) {
            Some(record) => {
                record.password_hash = Some(password_hash.to_owned());
                true
            }
            None => false,
        })
    }
}

#[derive(Default)]
struct MessageStore {
    rows: Vec<Message>,
    writes: u32,
}

/// Message store with strictly increasing creation timestamps.
///
/// Sender profiles are joined from the shared user store at read time.
pub struct InMemoryMessageRepository {
    users: Arc<InMemoryUserRepository>,
    store: Mutex<MessageStore>,
    unavailable: Mutex<bool>,
}

impl InMemoryMessageRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            store: Mutex::default(),
            unavailable: Mutex::default(),
        }
    }

    /// Make every later call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock(&self.unavailable) = unavailable;
    }

    /// Snapshot of every stored message, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.store).rows.clone()
    }

    fn check(&self) -> Result<(), MessagePersistenceError> {
        if *lock(&self.unavailable) {
            return Err(MessagePersistenceError::connection("message store offline"));
        }
        Ok(())
    }

    fn timestamp(seq: u32) -> DateTime<Utc> {
        let base = Utc
            .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_default();
        base + Duration::seconds(i64::from(seq))
    }

    fn with_row<T>(&self, id: &MessageId, f: impl FnOnce(&mut Message) -> T) -> Option<T> {
        lock(&self.store)
            .rows
            .iter_mut()
            .find(|message| message.id == *id)
            .map(f)
    }

    fn sender_of(&self, message: &Message) -> SenderProfile {
        lock(&self.users.records)
            .get(&message.sender_id)
            .map(|record| SenderProfile::from(&record.user))
            .unwrap_or_else(|| SenderProfile {
                display_name: message.sender_email.as_ref().to_owned(),
                email: message.sender_email.clone(),
                avatar_url: None,
            })
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn create(&self, message: &NewMessage) -> Result<Message, MessagePersistenceError> {
        self.check()?;
        let mut store = lock(&self.store);
        store.writes += 1;
        let stored = Message {
            id: MessageId::random(),
            sender_id: message.sender_id,
            sender_email: message.sender_email.clone(),
            to: message
                .recipients
                .iter()
                .map(|user| user.email().clone())
                .collect(),
            subject: message.subject.clone(),
            content: message.content.clone(),
            preview: message.preview.clone(),
            section: message.section,
            read: false,
            pinned: false,
            created_at: Self::timestamp(store.writes),
        };
        store.rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_for(
        &self,
        email: &EmailAddress,
        folder: Folder,
    ) -> Result<Vec<MailboxEntry>, MessagePersistenceError> {
        self.check()?;
        let visible: Vec<Message> = lock(&self.store)
            .rows
            .iter()
            .filter(|message| match folder {
                Folder::Inbox => message.to.contains(email),
                Folder::Sent => message.sender_email == *email,
                Folder::All => message.involves(email),
            })
            .cloned()
            .collect();
        let mut entries: Vec<MailboxEntry> = visible
            .into_iter()
            .map(|message| MailboxEntry {
                sender: self.sender_of(&message),
                message,
            })
            .collect();
        entries.sort_by(|a, b| b.message.created_at.cmp(&a.message.created_at));
        Ok(entries)
    }

    async fn find_participants(
        &self,
        id: &MessageId,
    ) -> Result<Option<MessageParticipants>, MessagePersistenceError> {
        self.check()?;
        Ok(self.with_row(id, |message| MessageParticipants {
            sender_email: message.sender_email.clone(),
            recipients: message.to.clone(),
        }))
    }

    async fn mark_read(&self, id: &MessageId) -> Result<bool, MessagePersistenceError> {
        self.check()?;
        Ok(self.with_row(id, |message| message.read = true).is_some())
    }

    async fn toggle_pinned(&self, id: &MessageId) -> Result<Option<bool>, MessagePersistenceError> {
        self.check()?;
        Ok(self.with_row(id, |message| {
            message.pinned = !message.pinned;
            message.pinned
        }))
    }

    async fn delete(&self, id: &MessageId) -> Result<bool, MessagePersistenceError> {
        self.check()?;
        let mut store = lock(&self.store);
        let before = store.rows.len();
        store.rows.retain(|message| message.id != *id);
        Ok(store.rows.len() < before)
    }
}

/// Reset token store that installs new hashes in the shared user store.
pub struct InMemoryPasswordResetRepository {
    users: Arc<InMemoryUserRepository>,
    tokens: Mutex<HashMap<UserId, ResetTokenRecord>>,
    unavailable: Mutex<bool>,
}

impl InMemoryPasswordResetRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self {
            users,
            tokens: Mutex::default(),
            unavailable: Mutex::default(),
        }
    }

    /// Outstanding token for `user_id`, if any.
    pub fn token_for(&self, user_id: &UserId) -> Option<ResetTokenRecord> {
        lock(&self.tokens).get(user_id).cloned()
    }

    /// Make every later call fail with a connection error.
    pub fn set_unavailable(&self, unavailable: bool) {
        *lock(&self.unavailable) = unavailable;
    }

    fn check(&self) -> Result<(), PasswordResetPersistenceError> {
        if *lock(&self.unavailable) {
            return Err(PasswordResetPersistenceError::connection(
                "reset token store offline",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PasswordResetRepository for InMemoryPasswordResetRepository {
    async fn replace(&self, record: &ResetTokenRecord) -> Result<(), PasswordResetPersistenceError> {
        self.check()?;
        lock(&self.tokens).insert(record.user_id, record.clone());
        Ok(())
    }

    async fn redeem(
        &self,
        user_id: &UserId,
        token_hash: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, PasswordResetPersistenceError> {
        self.check()?;
        let mut tokens = lock(&self.tokens);
        let valid = tokens
            .get(user_id)
            .is_some_and(|record| record.token_hash == token_hash && record.expires_at > now);
        if !valid {
            return Ok(false);
        }
        let mut records = lock(&self.users.records);
        let Some(record) = records.get_mut(user_id) else {
            return Ok(false);
        };
        record.password_hash = Some(password_hash.to_owned());
        tokens.remove(user_id);
        Ok(true)
    }
}

/// Clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        *lock(&self.0) += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Notifier that records every notification and can be told to fail.
#[derive(Default)]
pub struct RecordingMailNotifier {
    sent: Mutex<Vec<MailNotification>>,
    failing: Mutex<bool>,
}

impl RecordingMailNotifier {
    pub fn set_failing(&self, failing: bool) {
        *lock(&self.failing) = failing;
    }

    pub fn sent(&self) -> Vec<MailNotification> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl MailNotifier for RecordingMailNotifier {
    async fn send(
        &self,
        notification: &MailNotification,
    ) -> Result<NotificationReceipt, MailNotifierError> {
        if *lock(&self.failing) {
            return Err(MailNotifierError::rejected(500_u16, "provider outage"));
        }
        let mut sent = lock(&self.sent);
        sent.push(notification.clone());
        Ok(NotificationReceipt::Accepted {
            provider_id: Some(format!("test-{}", sent.len())),
        })
    }
}

/// Reversible "hash" so tests avoid Argon2's cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextHasher;

const PLAIN_PREFIX: &str = "plain$";

#[async_trait]
impl CredentialHasher for PlainTextHasher {
    async fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        Ok(format!("{PLAIN_PREFIX}{password}"))
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHasherError> {
        hash.strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == password)
            .ok_or_else(|| CredentialHasherError::corrupt("not a plain-text test hash"))
    }
}

/// Real services over in-memory adapters, with handles for assertions.
pub struct InMemoryStack {
    pub users: Arc<InMemoryUserRepository>,
    pub messages: Arc<InMemoryMessageRepository>,
    pub resets: Arc<InMemoryPasswordResetRepository>,
    pub notifier: Arc<RecordingMailNotifier>,
    pub clock: Arc<MutableClock>,
    pub view_cache: Arc<InMemoryMailboxViewCache>,
    pub accounts: Arc<AccountService<InMemoryUserRepository>>,
    pub mailbox: Arc<MailboxService<InMemoryUserRepository, InMemoryMessageRepository>>,
    pub password_reset:
        Arc<PasswordResetService<InMemoryUserRepository, InMemoryPasswordResetRepository>>,
    delivery: DeliverySettings,
    reset: ResetSettings,
}

impl InMemoryStack {
    /// Stack with the default recipient policy.
    pub fn new() -> Self {
        Self::with_delivery(DeliverySettings::default())
    }

    pub fn with_delivery(delivery: DeliverySettings) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let messages = Arc::new(InMemoryMessageRepository::new(users.clone()));
        let resets = Arc::new(InMemoryPasswordResetRepository::new(users.clone()));
        let clock = Arc::new(MutableClock::new(Utc::now()));
        Self::assemble(
            users,
            messages,
            resets,
            Arc::new(RecordingMailNotifier::default()),
            clock,
            delivery,
            ResetSettings::default(),
        )
    }

    /// Fresh services and caches over the same stores, as after a process
    /// restart.
    pub fn restarted(&self) -> Self {
        Self::assemble(
            self.users.clone(),
            self.messages.clone(),
            self.resets.clone(),
            self.notifier.clone(),
            self.clock.clone(),
            self.delivery.clone(),
            self.reset.clone(),
        )
    }

    fn assemble(
        users: Arc<InMemoryUserRepository>,
        messages: Arc<InMemoryMessageRepository>,
        resets: Arc<InMemoryPasswordResetRepository>,
        notifier: Arc<RecordingMailNotifier>,
        clock: Arc<MutableClock>,
        delivery: DeliverySettings,
        reset: ResetSettings,
    ) -> Self {
        let hasher = Arc::new(PlainTextHasher);
        let view_cache = Arc::new(InMemoryMailboxViewCache::new());
        let accounts = Arc::new(AccountService::new(users.clone(), hasher.clone()));
        let mailbox = Arc::new(MailboxService::new(
            users.clone(),
            messages.clone(),
            notifier.clone(),
            view_cache.clone(),
            delivery.clone(),
        ));
        let password_reset = Arc::new(PasswordResetService::new(
            users.clone(),
            resets.clone(),
            hasher,
            notifier.clone(),
            clock.clone(),
            reset.clone(),
        ));
        Self {
            users,
            messages,
            resets,
            notifier,
            clock,
            view_cache,
            accounts,
            mailbox,
            password_reset,
            delivery,
            reset,
        }
    }

    /// Ports bundle for building an HTTP app over this stack.
    pub fn http_ports(&self) -> HttpStatePorts {
        HttpStatePorts {
            login: self.accounts.clone(),
            accounts: self.accounts.clone(),
            profile: self.accounts.clone(),
            mailbox: self.mailbox.clone(),
            mailbox_query: self.mailbox.clone(),
            password_reset: self.password_reset.clone(),
        }
    }
}

impl Default for InMemoryStack {
    fn default() -> Self {
        Self::new()
    }
}
