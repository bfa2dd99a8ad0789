//! Database connection and schema migration helpers.
//!
//! This module wraps the Diesel connection pool used by the HTTP server and
//! exposes the embedded schema migrations that the admin CLI applies,
//! reverts, and reports on.

use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::migration::MigrationSource;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError, PooledConnection};
use diesel::sqlite::{Sqlite, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{error, info};
use thiserror::Error;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Versioned forward/backward schema scripts compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// Pragmas run on every connection handed out by the pool.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl SqlitePragmas {
    fn script(&self) -> String {
        format!(
            "PRAGMA journal_mode = WAL;\n\
             PRAGMA synchronous = NORMAL;\n\
             PRAGMA foreign_keys = ON;\n\
             PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        )
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&self.script())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Opens an r2d2 pool over the SQLite file at `database_url`.
pub fn establish_connection_pool(database_url: &str) -> Result<DbPool, PoolError> {
    let pragmas = SqlitePragmas {
        busy_timeout: BUSY_TIMEOUT,
    };
    Pool::builder()
        .connection_customizer(Box::new(pragmas))
        .build(ConnectionManager::<SqliteConnection>::new(database_url))
        .inspect_err(|e| error!("Failed to build connection pool for {database_url}: {e}"))
}

/// Errors raised while applying or reverting schema migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("no migration has been applied")]
    NothingToRevert,

    #[error("migration failed: {0}")]
    Failed(String),

    #[error("connection error: {0}")]
    Connection(#[from] PoolError),
}

impl From<Box<dyn std::error::Error + Send + Sync>> for MigrationError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        MigrationError::Failed(err.to_string())
    }
}

/// Applied/pending state of a single embedded migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationState {
    pub version: String,
    pub applied: bool,
}

/// Applies every pending migration in version order.
///
/// Each migration runs inside its own transaction, so a failing script leaves
/// the schema at the last successfully applied version.
pub fn run_pending_migrations(conn: &mut SqliteConnection) -> Result<Vec<String>, MigrationError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)?
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>();

    for version in &applied {
        info!("Applied migration {version}");
    }

    Ok(applied)
}

/// Runs the `down` script of the most recently applied migration.
pub fn revert_last_migration(conn: &mut SqliteConnection) -> Result<String, MigrationError> {
    if conn.applied_migrations()?.is_empty() {
        return Err(MigrationError::NothingToRevert);
    }

    let version = conn.revert_last_migration(MIGRATIONS)?.to_string();
    info!("Reverted migration {version}");
    Ok(version)
}

/// Reverts every applied migration, newest first, leaving an empty schema.
pub fn revert_all_migrations(conn: &mut SqliteConnection) -> Result<Vec<String>, MigrationError> {
    let reverted = conn
        .revert_all_migrations(MIGRATIONS)?
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>();

    for version in &reverted {
        info!("Reverted migration {version}");
    }

    Ok(reverted)
}

/// Reports every embedded migration together with whether it is applied.
pub fn migration_status(conn: &mut SqliteConnection) -> Result<Vec<MigrationState>, MigrationError> {
    let applied = conn
        .applied_migrations()?
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>();

    let mut all = MigrationSource::<Sqlite>::migrations(&MIGRATIONS)?
        .iter()
        .map(|m| m.name().version().to_string())
        .collect::<Vec<_>>();
    all.sort();

    Ok(all
        .into_iter()
        .map(|version| MigrationState {
            applied: applied.contains(&version),
            version,
        })
        .collect())
}
