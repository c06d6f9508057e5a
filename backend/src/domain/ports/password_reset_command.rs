//! Driving port for resetting a forgotten password by email.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, PasswordReset};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordResetCommand: Send + Sync {
    /// Mail a single-use reset link to `email`.
    ///
    /// Addresses without a password account succeed without sending
    /// anything, so the response never reveals which addresses exist.
    async fn request_reset(&self, email: &EmailAddress) -> Result<(), Error>;

    /// Replace the password when the emailed token is valid and unexpired.
    async fn reset_password(&self, reset: &PasswordReset) -> Result<(), Error>;
}

/// Reset command used when no database is configured; every request is
/// refused.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordResetCommand;

#[async_trait]
impl PasswordResetCommand for FixturePasswordResetCommand {
    async fn request_reset(&self, _email: &EmailAddress) -> Result<(), Error> {
        Err(Error::service_unavailable("account storage is not configured"))
    }

    async fn reset_password(&self, _reset: &PasswordReset) -> Result<(), Error> {
        Err(Error::service_unavailable("account storage is not configured"))
    }
}
