//! Compose payload validation and the recipient domain policy.
//!
//! Validation runs before any lookup or write: structural checks on every
//! field first, then the allow-list over the recipient domains.

use serde_json::json;

use super::Error;
use super::email_address::EmailAddress;

/// Domains accepted when nothing is configured.
pub const DEFAULT_ALLOWED_DOMAINS: [&str; 2] = ["gmail.com", "outlook.com"];

/// Recipient domain allow-list.
///
/// # Examples
/// ```
/// use courier::domain::{EmailAddress, RecipientPolicy};
///
/// let policy = RecipientPolicy::from_csv("example.org, Gmail.com");
/// assert!(policy.permits(&EmailAddress::parse("x@gmail.com").unwrap()));
/// assert!(!policy.permits(&EmailAddress::parse("x@outlook.com").unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientPolicy {
    allowed_domains: Vec<String>,
}

impl Default for RecipientPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_DOMAINS)
    }
}

impl RecipientPolicy {
    /// Build a policy from domain names; blanks are skipped and case is
    /// folded. An empty result falls back to [`DEFAULT_ALLOWED_DOMAINS`].
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut allowed_domains: Vec<String> = Vec::new();
        for domain in domains {
            let domain = domain.as_ref().trim().to_lowercase();
            if !domain.is_empty() && !allowed_domains.contains(&domain) {
                allowed_domains.push(domain);
            }
        }
        if allowed_domains.is_empty() {
            return Self::default();
        }
        Self { allowed_domains }
    }

    /// Parse a comma separated domain list.
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn allowed_domains(&self) -> &[String] {
        &self.allowed_domains
    }

    pub fn permits(&self, address: &EmailAddress) -> bool {
        self.allowed_domains
            .iter()
            .any(|domain| domain == address.domain())
    }

    fn describe(&self) -> String {
        match self.allowed_domains.as_slice() {
            [] => String::new(),
            [only] => only.clone(),
            [init @ .., last] => format!("{} and {last}", init.join(", ")),
        }
    }
}

/// Reasons a compose payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeValidationError {
    #[error("at least one recipient is required")]
    NoRecipients,
    #[error("Invalid email addresses: {}", .0.join(", "))]
    MalformedRecipients(Vec<String>),
    #[error("Invalid email addresses: {}. Only {allowed} addresses are accepted.", .addresses.join(", "))]
    DisallowedRecipients {
        addresses: Vec<String>,
        allowed: String,
    },
    #[error("subject must not be empty")]
    EmptySubject,
    #[error("content must not be empty")]
    EmptyContent,
}

impl ComposeValidationError {
    fn field(&self) -> &'static str {
        match self {
            Self::NoRecipients
            | Self::MalformedRecipients(_)
            | Self::DisallowedRecipients { .. } => "to",
            Self::EmptySubject => "subject",
            Self::EmptyContent => "content",
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NoRecipients => "no_recipients",
            Self::MalformedRecipients(_) => "malformed_recipients",
            Self::DisallowedRecipients { .. } => "disallowed_domain",
            Self::EmptySubject => "empty_subject",
            Self::EmptyContent => "empty_content",
        }
    }

    fn addresses(&self) -> Option<&[String]> {
        match self {
            Self::MalformedRecipients(addresses)
            | Self::DisallowedRecipients { addresses, .. } => Some(addresses),
            _ => None,
        }
    }
}

impl From<ComposeValidationError> for Error {
    fn from(value: ComposeValidationError) -> Self {
        let mut details = json!({ "field": value.field(), "code": value.code() });
        if let Some(addresses) = value.addresses() {
            details["addresses"] = json!(addresses);
        }
        Error::invalid_request(value.to_string()).with_details(details)
    }
}

/// Raw compose form as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ComposeDraft {
    pub to: Vec<String>,
    pub subject: String,
    pub content: String,
}

/// Compose payload that passed validation.
///
/// `to` holds distinct normalised addresses in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCompose {
    to: Vec<EmailAddress>,
    subject: String,
    content: String,
}

impl ValidatedCompose {
    pub fn to(&self) -> &[EmailAddress] {
        &self.to
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_parts(self) -> (Vec<EmailAddress>, String, String) {
        (self.to, self.subject, self.content)
    }
}

impl ComposeDraft {
    /// Validate the draft against structural rules and `policy`.
    ///
    /// Recipient entries are trimmed and blank entries dropped, so a trailing
    /// comma in the form does not count as a malformed address. Rejections
    /// name the entries as typed, in input order and including repeats;
    /// duplicates collapse only once every entry has passed.
    pub fn validate(
        self,
        policy: &RecipientPolicy,
    ) -> Result<ValidatedCompose, ComposeValidationError> {
        let entries: Vec<&str> = self
            .to
            .iter()
            .map(|entry| entry.trim())
            .filter(|entry| !entry.is_empty())
            .collect();
        if entries.is_empty() {
            return Err(ComposeValidationError::NoRecipients);
        }

        let mut malformed = Vec::new();
        let mut parsed: Vec<(&str, EmailAddress)> = Vec::with_capacity(entries.len());
        for entry in entries {
            match EmailAddress::parse(entry) {
                Ok(address) => parsed.push((entry, address)),
                Err(_) => malformed.push(entry.to_owned()),
            }
        }
        if !malformed.is_empty() {
            return Err(ComposeValidationError::MalformedRecipients(malformed));
        }
        if self.subject.trim().is_empty() {
            return Err(ComposeValidationError::EmptySubject);
        }
        if self.content.trim().is_empty() {
            return Err(ComposeValidationError::EmptyContent);
        }

        let disallowed: Vec<String> = parsed
            .iter()
            .filter(|(_, address)| !policy.permits(address))
            .map(|(raw, _)| (*raw).to_owned())
            .collect();
        if !disallowed.is_empty() {
            return Err(ComposeValidationError::DisallowedRecipients {
                addresses: disallowed,
                allowed: policy.describe(),
            });
        }

        let mut to: Vec<EmailAddress> = Vec::with_capacity(parsed.len());
        for (_, address) in parsed {
            if !to.contains(&address) {
                to.push(address);
            }
        }
        Ok(ValidatedCompose {
            to,
            subject: self.subject,
            content: self.content,
        })
    }
}
