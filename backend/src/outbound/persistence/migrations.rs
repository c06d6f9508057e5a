//! Embedded schema migrations applied at start-up.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failure while applying embedded migrations.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect for migrations: {0}")]
    Connect(#[from] diesel::ConnectionError),
    /// A migration failed to apply.
    #[error("failed to apply migrations: {0}")]
    Apply(String),
    /// The blocking migration task panicked or was cancelled.
    #[error("migration task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

fn apply_pending(database_url: &str) -> Result<usize, MigrationError> {
    let mut connection = PgConnection::establish(database_url)?;
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply(err.to_string()))?;
    Ok(applied.len())
}

/// Apply all pending migrations on a blocking worker thread.
///
/// Diesel's migration harness is synchronous, so this opens a dedicated
/// `PgConnection` rather than borrowing from the async pool.
pub async fn run_migrations(database_url: &str) -> Result<(), MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || apply_pending(&url)).await??;
    info!(applied, "database migrations up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::migration::MigrationSource;
    use rstest::rstest;

    #[rstest]
    fn embedded_migrations_are_present() {
        let migrations =
            MigrationSource::<diesel::pg::Pg>::migrations(&MIGRATIONS).expect("embedded");
        assert!(!migrations.is_empty());
    }

    #[tokio::test]
    async fn unreachable_database_is_a_connect_error() {
        let err = run_migrations("postgres://courier@127.0.0.1:1/none")
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, MigrationError::Connect(_)));
    }
}
