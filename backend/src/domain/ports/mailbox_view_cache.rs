//! Port for invalidating cached mailbox views.
//!
//! Writers signal every mutation so rendered views can be dropped. HTTP
//! validators never depend on this signal; they are derived from the
//! listing itself.

use async_trait::async_trait;

/// Route whose rendered mailbox is invalidated after message writes.
pub const MAILBOX_VIEW_PATH: &str = "/mail";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailboxViewCache: Send + Sync {
    /// Mark the view at `path` stale.
    async fn invalidate(&self, path: &str);
}

/// Cache that ignores invalidations.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailboxViewCache;

#[async_trait]
impl MailboxViewCache for FixtureMailboxViewCache {
    async fn invalidate(&self, _path: &str) {}
}
