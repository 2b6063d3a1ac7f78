//! Query building: filter expressions, sort descriptors, fetch requests.
//!
//! # Responsibility
//! - Translate `Filter` trees into SQL predicates with bound parameters.
//! - Render complete `SELECT` statements for a record entity.
//!
//! # Invariants
//! - Translation is pure and total; it never fails.
//! - Attribute names are always quoted, values are always bound.

mod fetch_request;
mod filter;
mod sort;

pub use fetch_request::FetchRequest;
pub use filter::{Filter, Predicate};
pub use sort::SortDescriptor;

/// Quotes `name` as an SQLite identifier, doubling embedded quotes.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
