//! Builders wiring driving ports to services and adapters.
//!
//! With a database pool every port is served by the domain services over
//! Diesel repositories. Without one the fixture ports stand in, so the
//! server still boots for local UI work.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use crate::domain::ports::{
    AccountCommand, FixtureAccountCommand, FixtureLoginService, FixtureMailboxCommand,
    FixtureMailboxQuery, FixturePasswordResetCommand, FixtureUserProfileQuery, LoginService,
    MailboxCommand, MailboxQuery, PasswordResetCommand, UserProfileQuery,
};
use crate::domain::{AccountService, MailboxService, PasswordResetService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::cache::InMemoryMailboxViewCache;
use crate::outbound::persistence::{
    DieselMessageRepository, DieselPasswordResetRepository, DieselUserRepository,
};
use crate::outbound::security::Argon2CredentialHasher;

use super::ServerConfig;

/// Ports served by the account service.
struct AccountPorts {
    login: Arc<dyn LoginService>,
    accounts: Arc<dyn AccountCommand>,
    profile: Arc<dyn UserProfileQuery>,
}

/// Ports served by the mailbox service.
struct MailboxPorts {
    command: Arc<dyn MailboxCommand>,
    query: Arc<dyn MailboxQuery>,
}

fn build_account_ports_with_pool<Pool, S>(
    pool: &Option<Pool>,
    make_service: impl FnOnce(&Pool) -> S,
) -> AccountPorts
where
    S: LoginService + AccountCommand + UserProfileQuery + 'static,
{
    match pool {
        Some(pool) => {
            let service = Arc::new(make_service(pool));
            AccountPorts {
                login: service.clone(),
                accounts: service.clone(),
                profile: service,
            }
        }
        None => AccountPorts {
            login: Arc::new(FixtureLoginService),
            accounts: Arc::new(FixtureAccountCommand),
            profile: Arc::new(FixtureUserProfileQuery),
        },
    }
}

fn build_mailbox_ports_with_pool<Pool, S>(
    pool: &Option<Pool>,
    make_service: impl FnOnce(&Pool) -> S,
) -> MailboxPorts
where
    S: MailboxCommand + MailboxQuery + 'static,
{
    match pool {
        Some(pool) => {
            let service = Arc::new(make_service(pool));
            MailboxPorts {
                command: service.clone(),
                query: service,
            }
        }
        None => MailboxPorts {
            command: Arc::new(FixtureMailboxCommand),
            query: Arc::new(FixtureMailboxQuery),
        },
    }
}

fn build_password_reset_port_with_pool<Pool, S>(
    pool: &Option<Pool>,
    make_service: impl FnOnce(&Pool) -> S,
) -> Arc<dyn PasswordResetCommand>
where
    S: PasswordResetCommand + 'static,
{
    match pool {
        Some(pool) => Arc::new(make_service(pool)),
        None => Arc::new(FixturePasswordResetCommand),
    }
}

/// Build the shared HTTP state from the configured pool and adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let accounts = build_account_ports_with_pool(&config.db_pool, |pool| {
        AccountService::new(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(Argon2CredentialHasher),
        )
    });
    let mailbox = build_mailbox_ports_with_pool(&config.db_pool, |pool| {
        MailboxService::new(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselMessageRepository::new(pool.clone())),
            config.notifier.clone(),
            Arc::new(InMemoryMailboxViewCache::new()),
            config.delivery.clone(),
        )
    });

    let password_reset = build_password_reset_port_with_pool(&config.db_pool, |pool| {
        PasswordResetService::new(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselPasswordResetRepository::new(pool.clone())),
            Arc::new(Argon2CredentialHasher),
            config.notifier.clone(),
            Arc::new(DefaultClock),
            config.reset.clone(),
        )
    });

    web::Data::new(HttpState::new(HttpStatePorts {
        login: accounts.login,
        accounts: accounts.accounts,
        profile: accounts.profile,
        mailbox: mailbox.command,
        mailbox_query: mailbox.query,
        password_reset,
    }))
}
