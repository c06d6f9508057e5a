//! Notifier used when no provider key is configured.

use async_trait::async_trait;
use tracing::info;

use crate::domain::MailNotification;
use crate::domain::ports::{MailNotifier, MailNotifierError, NotificationReceipt};

/// Logs each notification instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingMailNotifier;

#[async_trait]
impl MailNotifier for LoggingMailNotifier {
    async fn send(
        &self,
        notification: &MailNotification,
    ) -> Result<NotificationReceipt, MailNotifierError> {
        info!(
            recipients = notification.to.len(),
            subject = %notification.subject,
            "mail delivery disabled; notification not sent"
        );
        Ok(NotificationReceipt::Skipped)
    }
}
