//! Argon2id password hashing in PHC string format.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialHasher, CredentialHasherError};

/// Hasher using Argon2id with the crate's default parameters.
///
/// Hashing is CPU bound, so both operations run on Tokio's blocking pool.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2CredentialHasher;

fn hash_blocking(password: &str) -> Result<String, CredentialHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CredentialHasherError::hash(err.to_string()))
}

fn verify_blocking(password: &str, hash: &str) -> Result<bool, CredentialHasherError> {
    let parsed =
        PasswordHash::new(hash).map_err(|err| CredentialHasherError::corrupt(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(other) => Err(CredentialHasherError::corrupt(other.to_string())),
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &str) -> Result<String, CredentialHasherError> {
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&password))
            .await
            .map_err(|err| CredentialHasherError::hash(err.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHasherError> {
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(|err| CredentialHasherError::hash(err.to_string()))?
    }
}
