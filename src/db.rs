use anyhow::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub type OrmConn = DatabaseConnection;

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<OrmConn> {
    let mut options = ConnectOptions::new(database_url);
    options.max_connections(20).sqlx_logging(false);
    let conn = Database::connect(options).await?;
    Ok(conn)
}

/// Apply the SQL migrations in `migrations/` through the underlying sqlx pool.
/// Returns the version and description of every migration the binary knows.
pub async fn run_migrations(conn: &OrmConn) -> Result<Vec<(i64, String)>> {
    let migrator = sqlx::migrate!("./migrations");
    migrator.run(conn.get_postgres_connection_pool()).await?;
    tracing::info!(count = migrator.iter().count(), "migrations applied");
    Ok(migrator
        .iter()
        .map(|m| (m.version, m.description.to_string()))
        .collect())
}
