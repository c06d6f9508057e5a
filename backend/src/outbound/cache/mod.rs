//! In-process mailbox view revisions.
//!
//! Counters live for the lifetime of the process and are only an
//! invalidation log. They are never used as HTTP validators: a restart or a
//! second replica starts every path at zero again.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::MailboxViewCache;

/// Per-path revision counters behind a mutex.
#[derive(Debug, Default)]
pub struct InMemoryMailboxViewCache {
    revisions: Mutex<HashMap<String, u64>>,
}

impl InMemoryMailboxViewCache {
    /// Create an empty cache where every path starts at revision zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of invalidations recorded for `path` by this process.
    pub fn revision(&self, path: &str) -> u64 {
        self.revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MailboxViewCache for InMemoryMailboxViewCache {
    async fn invalidate(&self, path: &str) {
        let mut revisions = self
            .revisions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let revision = revisions.entry(path.to_owned()).or_default();
        *revision = revision.wrapping_add(1);
        debug!(path, revision = *revision, "mailbox view invalidated");
    }
}
