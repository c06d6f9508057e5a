//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already owns the address.
        DuplicateEmail { email: String } => "email {email} is already registered",
    }
}

/// User record together with its stored credential hash.
///
/// The hash is absent for accounts created by an external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` when the address is
    /// taken.
    async fn create(&self, record: &UserCredentials) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch every user whose email is in `emails`, in one round trip.
    ///
    /// Order of the result is unspecified; missing addresses are simply
    /// absent.
    async fn find_by_emails(
        &self,
        emails: &[EmailAddress],
    ) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user with its credential hash by email.
    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Fetch a user with its credential hash by identifier.
    async fn find_credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserCredentials>, UserPersistenceError>;

    /// Replace the stored credential hash. Returns `false` when no row
    /// matched.
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<bool, UserPersistenceError>;
}
