//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by the context layer.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::{apply_migrations, Migration};
use super::DbResult;
use crate::config::{StoreConfig, StoreLocation, DEFAULT_BUSY_TIMEOUT};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>, migrations: &[Migration]) -> DbResult<Connection> {
    let path = path.as_ref();
    open_with("file", || Connection::open(path), migrations, DEFAULT_BUSY_TIMEOUT)
}

/// Opens a private in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory(migrations: &[Migration]) -> DbResult<Connection> {
    open_with(
        "memory",
        Connection::open_in_memory,
        migrations,
        DEFAULT_BUSY_TIMEOUT,
    )
}

/// Opens the store described by `config`, honoring its busy timeout.
pub(crate) fn open_store(config: &StoreConfig) -> DbResult<Connection> {
    match &config.location {
        StoreLocation::File(path) => open_with(
            "file",
            || Connection::open(path),
            config.migrations,
            config.busy_timeout,
        ),
        StoreLocation::Memory => open_with(
            "memory",
            Connection::open_in_memory,
            config.migrations,
            config.busy_timeout,
        ),
    }
}

fn open_with(
    mode: &'static str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
    migrations: &[Migration],
    busy_timeout: Duration,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn, migrations, busy_timeout) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(
    conn: &mut Connection,
    migrations: &[Migration],
    busy_timeout: Duration,
) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    apply_migrations(conn, migrations)?;
    Ok(())
}
