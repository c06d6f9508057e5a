//! Authentication primitives: login credentials, registration drafts,
//! password changes and resets, and the authenticated caller.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::email_address::{EmailAddress, EmailAddressError};
use super::user::{DisplayName, UserId, UserValidationError};

/// Minimum length of a newly chosen password, in characters.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email was missing or malformed.
    InvalidEmail(EmailAddressError),
    /// Password was blank.
    EmptyPassword,
    /// A new password is shorter than [`PASSWORD_MIN_LENGTH`].
    PasswordTooShort { min: usize },
    /// First or last name did not form a valid display name.
    InvalidName(UserValidationError),
    /// A reset token was blank.
    EmptyToken,
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::InvalidName(err) => err.fmt(f),
            Self::EmptyToken => write!(f, "reset token must not be empty"),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl CredentialValidationError {
    /// Request field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "email",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
            Self::InvalidName(_) => "name",
            Self::EmptyToken => "token",
        }
    }
}

fn require_password(raw: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    if raw.is_empty() {
        return Err(CredentialValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(raw.to_owned()))
}

fn require_new_password(raw: &str) -> Result<Zeroizing<String>, CredentialValidationError> {
    let password = require_password(raw)?;
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(CredentialValidationError::PasswordTooShort {
            min: PASSWORD_MIN_LENGTH,
        });
    }
    Ok(password)
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is a normalised address.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons.
///
/// # Examples
/// ```
/// use courier::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("Ada@Gmail.com", "password").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@gmail.com");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::parse(email).map_err(CredentialValidationError::InvalidEmail)?;
        let password = require_password(password)?;
        Ok(Self { email, password })
    }

    /// Address used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDraft {
    display_name: DisplayName,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl RegistrationDraft {
    /// Construct a draft from the registration form fields.
    pub fn try_from_parts(
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let display_name = DisplayName::from_parts(first_name, last_name)
            .map_err(CredentialValidationError::InvalidName)?;
        let email = EmailAddress::parse(email).map_err(CredentialValidationError::InvalidEmail)?;
        let password = require_new_password(password)?;
        Ok(Self {
            display_name,
            email,
            password,
        })
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated password change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    replacement: Zeroizing<String>,
}

impl PasswordChange {
    /// Construct a change request; only the replacement is length-checked.
    pub fn try_from_parts(current: &str, replacement: &str) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            current: require_password(current)?,
            replacement: require_new_password(replacement)?,
        })
    }

    pub fn current(&self) -> &str {
        self.current.as_str()
    }

    pub fn replacement(&self) -> &str {
        self.replacement.as_str()
    }
}

/// Validated password reset submitted from an emailed link.
///
/// The token is kept verbatim apart from surrounding whitespace; it is only
/// ever compared through its digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    email: EmailAddress,
    token: Zeroizing<String>,
    replacement: Zeroizing<String>,
}

impl PasswordReset {
    pub fn try_from_parts(
        email: &str,
        token: &str,
        replacement: &str,
    ) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::parse(email).map_err(CredentialValidationError::InvalidEmail)?;
        let token = token.trim();
        if token.is_empty() {
            return Err(CredentialValidationError::EmptyToken);
        }
        Ok(Self {
            email,
            token: Zeroizing::new(token.to_owned()),
            replacement: require_new_password(replacement)?,
        })
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    pub fn token(&self) -> &str {
        self.token.as_str()
    }

    pub fn replacement(&self) -> &str {
        self.replacement.as_str()
    }
}

/// Authenticated identity attached to a request.
///
/// Mailbox scoping keys on `email`; `user_id` is kept for profile lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
    email: EmailAddress,
}

impl Caller {
    pub fn new(user_id: UserId, email: EmailAddress) -> Self {
        Self { user_id, email }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}
