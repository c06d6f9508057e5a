//! Shared helpers for integration suites that need a real PostgreSQL.
//!
//! The cluster comes from `pg-embed-setup-unpriv`; each test gets its own
//! temporary database with the embedded migrations applied.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;

/// Render a `postgres` error with the server message and SQLSTATE when
/// available.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => format!(
            "postgres error {:?}: {}",
            db_error.code(),
            db_error.message()
        ),
        None => error.to_string(),
    }
}
