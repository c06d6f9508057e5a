//! Shared identity used by fixture driving ports.

use crate::domain::{Caller, EmailAddress, Error, User, UserId};

pub(crate) const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";
pub(crate) const FIXTURE_EMAIL: &str = "ada@gmail.com";
pub(crate) const FIXTURE_PASSWORD: &str = "password";
pub(crate) const FIXTURE_DISPLAY_NAME: &str = "Ada Lovelace";

pub(crate) fn fixture_user() -> Result<User, Error> {
    User::try_from_strings(FIXTURE_USER_ID, FIXTURE_DISPLAY_NAME, FIXTURE_EMAIL)
        .map_err(|err| Error::internal(format!("invalid fixture user: {err}")))
}

pub(crate) fn fixture_caller() -> Result<Caller, Error> {
    let id = UserId::new(FIXTURE_USER_ID)
        .map_err(|err| Error::internal(format!("invalid fixture user id: {err}")))?;
    let email = EmailAddress::parse(FIXTURE_EMAIL)
        .map_err(|err| Error::internal(format!("invalid fixture email: {err}")))?;
    Ok(Caller::new(id, email))
}
