//! Password reset tokens and the settings used to mail reset links.
//!
//! A token is a random secret mailed to the account address. Only its
//! SHA-256 digest is stored, with an expiry, and a successful reset consumes
//! it.

use std::fmt;

use chrono::TimeDelta;
use sha2::{Digest, Sha256};
use url::form_urlencoded;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::email_address::EmailAddress;
use super::mailbox_service::DEFAULT_NOTIFY_FROM;

/// Page the emailed link points at when nothing is configured.
pub const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:3000/reset-password";
/// Lifetime of a reset token, in minutes, when nothing is configured.
pub const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Freshly generated reset secret.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken(Zeroizing<String>);

impl ResetToken {
    /// 64 hex characters drawn from two v4 UUIDs.
    pub fn generate() -> Self {
        let mut raw = String::with_capacity(64);
        raw.push_str(&Uuid::new_v4().simple().to_string());
        raw.push_str(&Uuid::new_v4().simple().to_string());
        Self(Zeroizing::new(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Digest persisted in place of the token.
    pub fn digest(&self) -> String {
        token_digest(self.as_str())
    }
}

impl fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResetToken(..)")
    }
}

/// Hex SHA-256 of a submitted token.
pub fn token_digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

/// Where reset links point, how long they live and who sends them.
#[derive(Debug, Clone)]
pub struct ResetSettings {
    /// Absolute URL of the reset page; `email` and `token` are appended as
    /// query parameters.
    pub link_base: String,
    pub ttl: TimeDelta,
    /// Provider-facing `from` header for reset emails.
    pub notify_from: String,
}

impl Default for ResetSettings {
    fn default() -> Self {
        Self {
            link_base: DEFAULT_RESET_LINK_BASE.to_owned(),
            ttl: TimeDelta::minutes(DEFAULT_RESET_TOKEN_TTL_MINUTES),
            notify_from: DEFAULT_NOTIFY_FROM.to_owned(),
        }
    }
}

impl ResetSettings {
    /// Link mailed to `email`.
    ///
    /// # Examples
    /// ```
    /// use courier::domain::{EmailAddress, ResetSettings, ResetToken};
    ///
    /// let settings = ResetSettings::default();
    /// let token = ResetToken::generate();
    /// let email = EmailAddress::parse("ada@gmail.com").unwrap();
    /// let link = settings.link_for(&email, &token);
    /// assert!(link.starts_with("http://localhost:3000/reset-password?email=ada%40gmail.com&token="));
    /// ```
    pub fn link_for(&self, email: &EmailAddress, token: &ResetToken) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("email", email.as_ref())
            .append_pair("token", token.as_str())
            .finish();
        let separator = if self.link_base.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.link_base)
    }

    /// Whole minutes a token stays valid, for the email copy.
    pub fn ttl_minutes(&self) -> i64 {
        self.ttl.num_minutes()
    }
}
