//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **notify**: transactional email delivery over HTTP
//! - **cache**: in-process mailbox view revisions
//! - **security**: Argon2 credential hashing
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod notify;
pub mod persistence;
pub mod security;
