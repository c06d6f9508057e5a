//! Embedded PostgreSQL provisioning for repository tests.

use courier::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;

use super::format_postgres_error;

/// Fresh database on the shared cluster with every migration applied.
pub fn migrated_database(runtime: &Runtime) -> Result<TemporaryDatabase, String> {
    let cluster = pg_embedded_setup_unpriv::test_support::shared_cluster_handle()
        .map_err(|err| format!("shared cluster: {err:?}"))?;
    let name = format!("courier_test_{}", uuid::Uuid::new_v4().simple());
    let database = cluster
        .temporary_database(name.as_str())
        .map_err(|err| format!("temporary database: {err:?}"))?;
    runtime
        .block_on(run_migrations(database.url()))
        .map_err(|err| format!("migrations: {err}"))?;
    Ok(database)
}

/// Count rows matching a single-parameter query such as
/// `SELECT count(*) FROM t WHERE c = $1`.
pub fn count_rows(url: &str, sql: &str, param: &uuid::Uuid) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(sql, &[param])
        .map_err(|err| format_postgres_error(&err))?;
    Ok(row.get(0))
}
