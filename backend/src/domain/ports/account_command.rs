//! Driving port for account mutations: registration and password change.

use async_trait::async_trait;

use crate::domain::{Error, PasswordChange, RegistrationDraft, User, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account with a hashed password.
    async fn register(&self, draft: &RegistrationDraft) -> Result<User, Error>;

    /// Replace the caller's password after checking the current one.
    async fn change_password(&self, user_id: &UserId, change: &PasswordChange)
    -> Result<(), Error>;
}

/// Account command used when no database is configured; every mutation is
/// refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountCommand;

#[async_trait]
impl AccountCommand for FixtureAccountCommand {
    async fn register(&self, _draft: &RegistrationDraft) -> Result<User, Error> {
        Err(Error::service_unavailable("account storage is not configured"))
    }

    async fn change_password(
        &self,
        _user_id: &UserId,
        _change: &PasswordChange,
    ) -> Result<(), Error> {
        Err(Error::service_unavailable("account storage is not configured"))
    }
}
