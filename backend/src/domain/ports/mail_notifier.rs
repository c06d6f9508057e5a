//! Port for the outbound transactional email provider.

use async_trait::async_trait;

use crate::domain::MailNotification;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail notifier adapters.
    pub enum MailNotifierError {
        /// The provider did not answer within the configured timeout.
        Timeout { message: String } => "mail provider timed out: {message}",
        /// The request could not be delivered to the provider.
        Transport { message: String } => "mail provider transport failed: {message}",
        /// The provider answered with a non-success status.
        Rejected { status: u16, message: String } =>
            "mail provider rejected the request with status {status}: {message}",
        /// The provider response could not be decoded.
        Decode { message: String } => "mail provider response was malformed: {message}",
    }
}

/// What the notifier did with a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationReceipt {
    /// The provider accepted the email, optionally returning its id.
    Accepted { provider_id: Option<String> },
    /// Delivery is disabled; nothing left the process.
    Skipped,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailNotifier: Send + Sync {
    /// Submit one notification. No retries.
    async fn send(
        &self,
        notification: &MailNotification,
    ) -> Result<NotificationReceipt, MailNotifierError>;
}

/// Notifier that accepts nothing and reports every send as skipped.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailNotifier;

#[async_trait]
impl MailNotifier for FixtureMailNotifier {
    async fn send(
        &self,
        _notification: &MailNotification,
    ) -> Result<NotificationReceipt, MailNotifierError> {
        Ok(NotificationReceipt::Skipped)
    }
}
