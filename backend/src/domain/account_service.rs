//! Account domain service: registration, login, profile reads and password
//! changes over the user repository and credential hasher ports.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{
    AccountCommand, CredentialHasher, CredentialHasherError, LoginService, UserCredentials,
    UserPersistenceError, UserProfileQuery, UserRepository,
};
use crate::domain::{
    Caller, Error, LoginCredentials, PasswordChange, RegistrationDraft, User, UserId,
};

fn map_repository_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            warn!(error = %message, "user store unavailable");
            Error::service_unavailable("account service is temporarily unavailable")
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => duplicate_email(),
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(format!("credential check failed: {error}"))
}

fn duplicate_email() -> Error {
    Error::conflict("an account with this email already exists")
        .with_details(json!({ "field": "email", "code": "duplicate_email" }))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid credentials")
}

/// Account service implementing [`LoginService`], [`AccountCommand`] and
/// [`UserProfileQuery`].
#[derive(Clone)]
pub struct AccountService<U> {
    users: Arc<U>,
    hasher: Arc<dyn CredentialHasher>,
}

impl<U> AccountService<U> {
    /// Create a new account service.
    pub fn new(users: Arc<U>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }
}

impl<U> AccountService<U>
where
    U: UserRepository,
{
    /// Check `password` against the stored hash. Accounts without a hash
    /// (external identity provider) never match.
    async fn verify(&self, record: &UserCredentials, password: &str) -> Result<bool, Error> {
        let Some(hash) = record.password_hash.as_deref() else {
            return Ok(false);
        };
        self.hasher
            .verify(password, hash)
            .await
            .map_err(map_hasher_error)
    }
}

#[async_trait]
impl<U> LoginService for AccountService<U>
where
    U: UserRepository,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Caller, Error> {
        let record = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_repository_error)?
            .ok_or_else(invalid_credentials)?;
        if !self.verify(&record, credentials.password()).await? {
            return Err(invalid_credentials());
        }
        Ok(Caller::new(*record.user.id(), record.user.email().clone()))
    }
}

#[async_trait]
impl<U> AccountCommand for AccountService<U>
where
    U: UserRepository,
{
    async fn register(&self, draft: &RegistrationDraft) -> Result<User, Error> {
        let hash = self
            .hasher
            .hash(draft.password())
            .await
            .map_err(map_hasher_error)?;
        let user = User::new(
            UserId::random(),
            draft.display_name().clone(),
            draft.email().clone(),
        );
        self.users
            .create(&UserCredentials {
                user: user.clone(),
                password_hash: Some(hash),
            })
            .await
            .map_err(map_repository_error)?;
        Ok(user)
    }

    async fn change_password(
        &self,
        user_id: &UserId,
        change: &PasswordChange,
    ) -> Result<(), Error> {
        let record = self
            .users
            .find_credentials_by_id(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;
        if !self.verify(&record, change.current()).await? {
            return Err(Error::unauthorized("current password is incorrect"));
        }
        let hash = self
            .hasher
            .hash(change.replacement())
            .await
            .map_err(map_hasher_error)?;
        let updated = self
            .users
            .update_password_hash(user_id, &hash)
            .await
            .map_err(map_repository_error)?;
        if updated {
            Ok(())
        } else {
            Err(Error::not_found(format!("user {user_id} not found")))
        }
    }
}

#[async_trait]
impl<U> UserProfileQuery for AccountService<U>
where
    U: UserRepository,
{
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))
    }
}
