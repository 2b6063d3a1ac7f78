//! Store configuration.
//!
//! # Responsibility
//! - Describe where a record store lives and how contexts are handed out.
//!
//! # Invariants
//! - In-memory stores always run in `ContextMode::Shared`; a second
//!   connection would open a different, empty database.

use crate::db::Migration;
use std::path::PathBuf;
use std::time::Duration;

/// Busy timeout applied to every opened connection unless overridden.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Physical location of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// How a container hands out contexts to background tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContextMode {
    /// One connection owned by the container; tasks run one at a time on it.
    #[default]
    Shared,
    /// Every task opens its own connection to the store file.
    Background,
}

/// Configuration consumed by `PersistentContainer::open`.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub location: StoreLocation,
    pub mode: ContextMode,
    pub busy_timeout: Duration,
    pub migrations: &'static [Migration],
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::with_location(StoreLocation::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::with_location(StoreLocation::Memory)
    }

    fn with_location(location: StoreLocation) -> Self {
        Self {
            location,
            mode: ContextMode::default(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            migrations: &[],
        }
    }

    pub fn with_mode(mut self, mode: ContextMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn with_migrations(mut self, migrations: &'static [Migration]) -> Self {
        self.migrations = migrations;
        self
    }

    /// Mode actually used by the container for this location.
    pub fn effective_mode(&self) -> ContextMode {
        match self.location {
            StoreLocation::Memory => ContextMode::Shared,
            StoreLocation::File(_) => self.mode,
        }
    }
}
