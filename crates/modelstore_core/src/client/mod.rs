//! CRUD clients over model/record pairs.
//!
//! # Responsibility
//! - Define the async provider contracts callers depend on.
//! - Provide the live SQLite-backed clients and an in-memory test double.
//!
//! # Invariants
//! - Update and delete locate the record by the model's identifier.
//! - A lookup miss on update/delete is a reported failure, never a no-op.
//! - Value-indexed lookups exist only on clients built with a `ValueIndex`.

mod error;
mod live;
mod memory;
mod provider;
mod value_fetched;

pub use error::{DatabaseProviderError, ProviderResult};
pub use live::DatabaseClient;
pub use memory::{InMemoryDatabaseClient, InMemoryValueFetchedClient};
pub use provider::{DatabaseProvider, ValueFetchedDatabaseProvider};
pub use value_fetched::{ValueFetchedDatabaseClient, ValueIndex};
