//! Email address value type.
//!
//! Addresses are the identity key for users and mailboxes, so they are
//! trimmed and lower-cased on construction and compared by value afterwards.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Validation errors returned by [`EmailAddress::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailAddressError {
    /// Input was blank once trimmed.
    #[error("email address must not be empty")]
    Empty,
    /// Input is not shaped like `local@domain.tld`.
    #[error("`{0}` is not a valid email address")]
    Malformed(String),
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address.
///
/// ## Invariants
/// - No surrounding whitespace and no internal whitespace.
/// - Exactly one `@`, followed by a domain containing a dot.
/// - Lower case.
///
/// # Examples
/// ```
/// use courier::domain::EmailAddress;
///
/// let addr = EmailAddress::parse("  Ada@Gmail.com ").unwrap();
/// assert_eq!(addr.as_ref(), "ada@gmail.com");
/// assert_eq!(addr.domain(), "gmail.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an address.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, EmailAddressError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EmailAddressError::Empty);
        }
        if !email_regex().is_match(trimmed) {
            return Err(EmailAddressError::Malformed(trimmed.to_owned()));
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Domain part after the `@`.
    pub fn domain(&self) -> &str {
        self.0
            .rsplit_once('@')
            .map_or(self.0.as_str(), |(_, domain)| domain)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
