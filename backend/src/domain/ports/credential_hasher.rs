//! Port for one-way password hashing.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hasher adapters.
    pub enum CredentialHasherError {
        /// Hashing failed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        Corrupt { message: String } => "stored password hash is invalid: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Produce a self-describing hash of `password`.
    async fn hash(&self, password: &str) -> Result<String, CredentialHasherError>;

    /// Check `password` against a hash produced by [`CredentialHasher::hash`].
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHasherError>;
}
