//! Port for stored password reset tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password reset repository adapters.
    pub enum PasswordResetPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "password reset repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "password reset repository query failed: {message}",
    }
}

/// Outstanding reset token for one account. Only the digest is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenRecord {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetRepository: Send + Sync {
    /// Store `record`, replacing any token already issued to the same user.
    async fn replace(&self, record: &ResetTokenRecord) -> Result<(), PasswordResetPersistenceError>;

    /// Atomically consume the user's token and install `password_hash`.
    ///
    /// Succeeds with `false`, changing nothing, unless a token with
    /// `token_hash` exists for `user_id` and expires after `now`.
    async fn redeem(
        &self,
        user_id: &UserId,
        token_hash: &str,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, PasswordResetPersistenceError>;
}
