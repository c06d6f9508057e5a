//! Driving port for mailbox reads.

use async_trait::async_trait;

use crate::domain::{Caller, Error, Folder, MailboxEntry};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailboxQuery: Send + Sync {
    /// Messages visible to the caller in `folder`, newest first.
    ///
    /// Store failures are errors; an empty vector always means "no
    /// messages".
    async fn list_mailbox(&self, caller: &Caller, folder: Folder)
    -> Result<Vec<MailboxEntry>, Error>;
}

/// Query port used when no database is configured; every mailbox is empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailboxQuery;

#[async_trait]
impl MailboxQuery for FixtureMailboxQuery {
    async fn list_mailbox(
        &self,
        _caller: &Caller,
        _folder: Folder,
    ) -> Result<Vec<MailboxEntry>, Error> {
        Ok(Vec::new())
    }
}
