use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::migration::Migrator;

pub type OrmConn = DatabaseConnection;

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<OrmConn> {
    let mut opts = ConnectOptions::new(database_url);
    // Every pooled connection to an in-memory SQLite database sees its own
    // empty database, so those pools are pinned to one connection.
    if database_url.contains(":memory:") {
        opts.max_connections(1).min_connections(1);
    }
    opts.sqlx_logging(false);
    let conn = Database::connect(opts).await?;
    Ok(conn)
}

/// Apply all pending schema migrations.
pub async fn run_migrations(conn: &OrmConn) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}
