//! Password reset service: issue emailed reset links and redeem them.
//!
//! Requests for unknown addresses answer exactly like known ones. Tokens
//! are single use, stored as digests and expire after
//! [`ResetSettings::ttl`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    CredentialHasher, MailNotifier, NotificationReceipt, PasswordResetCommand,
    PasswordResetPersistenceError, PasswordResetRepository, ResetTokenRecord,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    EmailAddress, Error, MailNotification, PasswordReset, ResetSettings, ResetToken, token_digest,
};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            warn!(error = %message, "user store unavailable");
            Error::service_unavailable("password reset is temporarily unavailable")
        }
        other => Error::internal(format!("user repository error: {other}")),
    }
}

fn map_reset_error(error: PasswordResetPersistenceError) -> Error {
    match error {
        PasswordResetPersistenceError::Connection { message } => {
            warn!(error = %message, "reset token store unavailable");
            Error::service_unavailable("password reset is temporarily unavailable")
        }
        PasswordResetPersistenceError::Query { message } => {
            Error::internal(format!("reset token repository error: {message}"))
        }
    }
}

fn invalid_reset_link() -> Error {
    Error::invalid_request("This reset link is invalid or has expired")
        .with_details(json!({ "field": "token", "code": "invalid_reset_token" }))
}

/// Service implementing [`PasswordResetCommand`].
#[derive(Clone)]
pub struct PasswordResetService<U, R> {
    users: Arc<U>,
    resets: Arc<R>,
    hasher: Arc<dyn CredentialHasher>,
    notifier: Arc<dyn MailNotifier>,
    clock: Arc<dyn Clock>,
    settings: ResetSettings,
}

impl<U, R> PasswordResetService<U, R> {
    pub fn new(
        users: Arc<U>,
        resets: Arc<R>,
        hasher: Arc<dyn CredentialHasher>,
        notifier: Arc<dyn MailNotifier>,
        clock: Arc<dyn Clock>,
        settings: ResetSettings,
    ) -> Self {
        Self {
            users,
            resets,
            hasher,
            notifier,
            clock,
            settings,
        }
    }
}

impl<U, R> PasswordResetService<U, R>
where
    U: UserRepository,
    R: PasswordResetRepository,
{
    async fn mail_link(&self, email: &EmailAddress, token: &ResetToken) -> Result<(), Error> {
        let link = self.settings.link_for(email, token);
        let mail = MailNotification::for_password_reset(
            &self.settings.notify_from,
            email,
            &link,
            self.settings.ttl_minutes(),
        );
        match self.notifier.send(&mail).await {
            Ok(NotificationReceipt::Accepted { provider_id }) => {
                info!(
                    provider_id = provider_id.as_deref().unwrap_or("-"),
                    "password reset email accepted"
                );
                Ok(())
            }
            Ok(NotificationReceipt::Skipped) => {
                info!("mail delivery disabled; password reset email not sent");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "password reset email failed");
                Err(Error::service_unavailable(
                    "the reset email could not be sent; try again shortly",
                ))
            }
        }
    }
}

#[async_trait]
impl<U, R> PasswordResetCommand for PasswordResetService<U, R>
where
    U: UserRepository,
    R: PasswordResetRepository,
{
    async fn request_reset(&self, email: &EmailAddress) -> Result<(), Error> {
        let record = self
            .users
            .find_credentials_by_email(email)
            .await
            .map_err(map_user_error)?;
        let Some(record) = record.filter(|record| record.password_hash.is_some()) else {
            info!("password reset requested for an address without a password account");
            return Ok(());
        };

        let token = ResetToken::generate();
        self.resets
            .replace(&ResetTokenRecord {
                user_id: *record.user.id(),
                token_hash: token.digest(),
                expires_at: self.clock.utc() + self.settings.ttl,
            })
            .await
            .map_err(map_reset_error)?;
        self.mail_link(email, &token).await
    }

    async fn reset_password(&self, reset: &PasswordReset) -> Result<(), Error> {
        let record = self
            .users
            .find_credentials_by_email(reset.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(invalid_reset_link)?;
        let user_id = *record.user.id();
        let hash = self
            .hasher
            .hash(reset.replacement())
            .await
            .map_err(|err| Error::internal(format!("credential hashing failed: {err}")))?;
        let redeemed = self
            .resets
            .redeem(&user_id, &token_digest(reset.token()), self.clock.utc(), &hash)
            .await
            .map_err(map_reset_error)?;
        if !redeemed {
            return Err(invalid_reset_link());
        }
        info!(%user_id, "password reset");
        Ok(())
    }
}

#[cfg(test)]
#[path = "password_reset_service_tests.rs"]
mod tests;
