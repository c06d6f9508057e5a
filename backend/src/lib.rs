//! Courier: message delivery and mailbox queries for an email client.
//!
//! Layout follows ports and adapters: [`domain`] holds the model, the
//! services and the port traits; [`inbound`] and [`outbound`] hold the HTTP
//! adapter and the persistence, notification, cache and hashing adapters;
//! [`server`] wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
