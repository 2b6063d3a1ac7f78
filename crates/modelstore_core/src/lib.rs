//! Model/record persistence adapter over SQLite.
//!
//! Domain models convert into persisted records inside a context; generic
//! clients expose create/fetch/update/delete (plus value-indexed fetches)
//! on top of store contexts and fetch requests.

pub mod client;
pub mod config;
pub mod context;
pub mod convert;
pub mod db;
pub mod logging;
pub mod mapping;
pub mod query;

pub use client::{
    DatabaseClient, DatabaseProvider, DatabaseProviderError, InMemoryDatabaseClient,
    InMemoryValueFetchedClient, ProviderResult, ValueFetchedDatabaseClient,
    ValueFetchedDatabaseProvider, ValueIndex,
};
pub use config::{ContextMode, StoreConfig, StoreLocation};
pub use context::{Context, PersistentContainer};
pub use convert::{EntityDescription, ModelConvertible, StoreConvertible};
pub use db::{DbError, DbResult, Migration};
pub use logging::{default_log_level, init_logging, logging_status};
pub use mapping::{FieldMapping, FieldValue, Json, MappingError, TransformError, Transformable};
pub use query::{FetchRequest, Filter, Predicate, SortDescriptor};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
