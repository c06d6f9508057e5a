//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::{DeliverySettings, ResetSettings};
use crate::domain::ports::MailNotifier;
use crate::inbound::http::session_config::SessionSettings;
use crate::outbound::notify::LoggingMailNotifier;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) delivery: DeliverySettings,
    pub(crate) reset: ResetSettings,
    pub(crate) notifier: Arc<dyn MailNotifier>,
}

impl ServerConfig {
    /// Configuration with default delivery settings and a logging notifier.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr) -> Self {
        Self {
            session,
            bind_addr,
            db_pool: None,
            delivery: DeliverySettings::default(),
            reset: ResetSettings::default(),
            notifier: Arc::new(LoggingMailNotifier),
        }
    }

    /// Attach a database pool; without one the server uses fixture ports.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Replace the recipient policy and notification sender.
    #[must_use]
    pub fn with_delivery(mut self, delivery: DeliverySettings) -> Self {
        self.delivery = delivery;
        self
    }

    /// Replace where password reset links point and how long they live.
    #[must_use]
    pub fn with_reset(mut self, reset: ResetSettings) -> Self {
        self.reset = reset;
        self
    }

    /// Replace the outbound notifier.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn MailNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
