//! Connection pool bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Build file or in-memory connection pools.
//! - Configure connection pragmas required by store behavior.
//! - Trigger schema migrations before returning a usable pool.
//!
//! # Invariants
//! - Pooled connections have `foreign_keys=ON` and a busy timeout.
//! - Returned pools point at a database with migrations fully applied.
//! - The in-memory pool holds exactly one connection that is never recycled,
//!   otherwise the database would vanish with it.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use r2d2::{Builder, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Pool of SQLite connections used by the durable store.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Connection checked out of [`ConnectionPool`]; returned to the pool on drop.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Tuning knobs for the durable store's connection pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of open connections.
    pub max_size: u32,
    /// How long a checkout waits before failing with a connectivity error.
    pub connection_timeout: Duration,
    /// SQLite busy timeout applied to every new connection.
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 4,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
struct ConnectionCustomizer {
    busy_timeout: Duration,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(())
    }
}

/// Opens a pool over a SQLite database file and applies pending migrations.
///
/// # Side effects
/// - Creates the database file when it does not exist yet.
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool(path: impl AsRef<Path>, config: &PoolConfig) -> DbResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(path);
    let builder = Pool::builder()
        .max_size(config.max_size)
        .connection_timeout(config.connection_timeout);
    build_pool("file", builder, manager, config.busy_timeout)
}

/// Opens a single-connection in-memory pool and applies pending migrations.
///
/// Intended for tests and throwaway runs; data is lost when the pool drops.
pub fn open_pool_in_memory() -> DbResult<ConnectionPool> {
    let config = PoolConfig::default();
    let builder = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(config.connection_timeout);
    build_pool(
        "memory",
        builder,
        SqliteConnectionManager::memory(),
        config.busy_timeout,
    )
}

fn build_pool(
    mode: &'static str,
    builder: Builder<SqliteConnectionManager>,
    manager: SqliteConnectionManager,
    busy_timeout: Duration,
) -> DbResult<ConnectionPool> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let pool = match builder
        .connection_customizer(Box::new(ConnectionCustomizer { busy_timeout }))
        .build(manager)
    {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_pool(&pool) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_pool(pool: &ConnectionPool) -> DbResult<()> {
    let mut conn = pool.get()?;
    apply_migrations(&mut conn)?;
    Ok(())
}
