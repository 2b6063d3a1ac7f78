//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing a record store.
//! - Apply application-registered schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No record is read or written before migrations succeed.

use crate::mapping::TransformError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use migrations::{apply_migrations, latest_version, Migration};
pub use open::{open_db, open_db_in_memory};
pub(crate) use open::open_store;

pub type DbResult<T> = Result<T, DbError>;

/// Store-level error shared by contexts, containers and record decoding.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    NonMonotonicMigration {
        previous: u32,
        next: u32,
    },
    /// A persisted row could not be decoded into its record type.
    InvalidData(String),
    Transform(TransformError),
    UnknownAttribute {
        entity: &'static str,
        attribute: String,
    },
    /// A pending delete or assignment matched no stored row at save time.
    RecordNotFound {
        entity: &'static str,
    },
    /// Blocking store task panicked or was cancelled by the runtime.
    TaskFailed(String),
    LockPoisoned,
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::NonMonotonicMigration { previous, next } => write!(
                f,
                "migration version {next} does not follow {previous}; versions must increase"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::Transform(err) => write!(f, "{err}"),
            Self::UnknownAttribute { entity, attribute } => {
                write!(f, "entity `{entity}` has no attribute `{attribute}`")
            }
            Self::RecordNotFound { entity } => {
                write!(f, "no {entity} record matches the pending change")
            }
            Self::TaskFailed(message) => write!(f, "store task failed: {message}"),
            Self::LockPoisoned => write!(f, "shared context lock poisoned"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Transform(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::NonMonotonicMigration { .. }
            | Self::InvalidData(_)
            | Self::UnknownAttribute { .. }
            | Self::RecordNotFound { .. }
            | Self::TaskFailed(_)
            | Self::LockPoisoned => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<TransformError> for DbError {
    fn from(value: TransformError) -> Self {
        Self::Transform(value)
    }
}
