//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and depend only on driving
//! ports, so they can be exercised with fixtures or mocks and no I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, FixtureAccountCommand, FixtureLoginService, FixtureMailboxCommand,
    FixtureMailboxQuery, FixturePasswordResetCommand, FixtureUserProfileQuery, LoginService,
    MailboxCommand, MailboxQuery, PasswordResetCommand, UserProfileQuery,
};

/// Parameter object bundling the port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub mailbox: Arc<dyn MailboxCommand>,
    pub mailbox_query: Arc<dyn MailboxQuery>,
    pub password_reset: Arc<dyn PasswordResetCommand>,
}

impl HttpStatePorts {
    /// Fixture implementations for every port; used when no database is
    /// configured.
    pub fn fixtures() -> Self {
        Self {
            login: Arc::new(FixtureLoginService),
            accounts: Arc::new(FixtureAccountCommand),
            profile: Arc::new(FixtureUserProfileQuery),
            mailbox: Arc::new(FixtureMailboxCommand),
            mailbox_query: Arc::new(FixtureMailboxQuery),
            password_reset: Arc::new(FixturePasswordResetCommand),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountCommand>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub mailbox: Arc<dyn MailboxCommand>,
    pub mailbox_query: Arc<dyn MailboxQuery>,
    pub password_reset: Arc<dyn PasswordResetCommand>,
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use courier::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::fixtures());
    /// let _mailbox = state.mailbox.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            accounts,
            profile,
            mailbox,
            mailbox_query,
            password_reset,
        } = ports;
        Self {
            login,
            accounts,
            profile,
            mailbox,
            mailbox_query,
            password_reset,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
