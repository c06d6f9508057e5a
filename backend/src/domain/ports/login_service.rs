//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing (or importing) the backing
//! infrastructure. This makes HTTP handler tests deterministic because they
//! can substitute a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::{Caller, Error, LoginCredentials};

use super::fixtures::{FIXTURE_EMAIL, FIXTURE_PASSWORD, fixture_caller};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated caller.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Caller, Error>;
}

/// In-memory authenticator used when no database is configured.
///
/// `ada@gmail.com` / `password` authenticates successfully and produces a
/// fixed user id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Caller, Error> {
        if credentials.email().as_ref() == FIXTURE_EMAIL
            && credentials.password() == FIXTURE_PASSWORD
        {
            fixture_caller()
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case("ada@gmail.com", "password", true)]
    #[case("ADA@gmail.com", "password", true)]
    #[case("ada@gmail.com", "wrong", false)]
    #[case("bob@gmail.com", "password", false)]
    #[tokio::test]
    async fn fixture_login_service_accepts_only_the_fixture_account(
        #[case] email: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let service = FixtureLoginService;
        let creds = LoginCredentials::try_from_parts(email, password).expect("credentials shape");
        let result = service.authenticate(&creds).await;
        match (should_succeed, result) {
            (true, Ok(caller)) => assert_eq!(caller.email().as_ref(), FIXTURE_EMAIL),
            (false, Err(err)) => assert_eq!(err.code(), ErrorCode::Unauthorized),
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(caller)) => panic!("expected failure, got success: {caller:?}"),
        }
    }
}
