//! Cache validation for mailbox reads.
//!
//! Mailbox responses are private and must be revalidated on every use. The
//! entity tag is computed from the listing itself (caller, folder and every
//! entry's id, flags and sender projection), so it stays correct across
//! restarts and between replicas that share a database.

use actix_web::HttpRequest;
use actix_web::http::header::{self, EntityTag, Header, IfNoneMatch};
use sha2::{Digest, Sha256};

use crate::domain::{EmailAddress, Folder, MailboxEntry};

/// Private responses must always be revalidated before reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Standard cache-control header tuple for private API responses.
pub fn private_no_cache_header() -> (header::HeaderName, &'static str) {
    (header::CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}

/// Strong entity tag for one caller's view of one folder.
///
/// Entries are hashed in listing order; any added, removed, re-read or
/// re-pinned message changes the tag.
pub fn mailbox_etag(caller: &EmailAddress, folder: Folder, entries: &[MailboxEntry]) -> EntityTag {
    let mut hasher = Sha256::new();
    hasher.update(caller.as_ref().as_bytes());
    hasher.update([0]);
    hasher.update(folder.as_str().as_bytes());
    hasher.update([0]);
    hasher.update((entries.len() as u64).to_be_bytes());
    for entry in entries {
        let message = &entry.message;
        hasher.update(message.id.as_uuid().as_bytes());
        hasher.update([u8::from(message.read), u8::from(message.pinned)]);
        hasher.update(entry.sender.display_name.as_bytes());
        hasher.update([0]);
        hasher.update(entry.sender.avatar_url.as_deref().unwrap_or_default().as_bytes());
        hasher.update([0]);
    }
    let digest = hasher.finalize();
    EntityTag::new_strong(hex::encode(&digest[..16]))
}

/// Whether the request's `If-None-Match` already names `etag`.
pub fn is_not_modified(req: &HttpRequest, etag: &EntityTag) -> bool {
    match IfNoneMatch::parse(req) {
        Ok(IfNoneMatch::Any) => true,
        Ok(IfNoneMatch::Items(tags)) => tags.iter().any(|tag| tag.weak_eq(etag)),
        Err(_) => false,
    }
}
