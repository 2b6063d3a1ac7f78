//! Model/record conversion contracts.
//!
//! # Responsibility
//! - `StoreConvertible`: implemented by domain models to produce a record
//!   inside a context.
//! - `ModelConvertible`: implemented by records to decode from a row,
//!   convert back to a model and build identifier lookups.
//!
//! # Invariants
//! - Conversion is total and deterministic in both directions.
//! - The identifier survives a model -> record -> model round-trip.

mod entity;

pub use entity::EntityDescription;

use crate::context::Context;
use crate::db::{DbError, DbResult};
use crate::mapping::FieldValue;
use crate::query::{FetchRequest, Filter};
use rusqlite::types::Value;
use rusqlite::Row;
use std::hash::Hash;
use uuid::Uuid;

/// Persisted representation of a model.
pub trait ModelConvertible: Sized + Send + 'static {
    type Model;
    type Id: FieldValue + Clone + Send + Sync + 'static;

    /// Table, identifier attribute and declared attributes of this record.
    const ENTITY: EntityDescription;

    fn id(&self) -> Self::Id;

    fn convert(&self) -> Self::Model;

    /// Decodes one row selected with `ENTITY.attributes`.
    fn from_row(row: &Row<'_>) -> DbResult<Self>;

    /// Attribute values written on insert, in `ENTITY.attributes` order.
    fn values(&self) -> Vec<(&'static str, Value)>;

    /// Default query used by `fetch`: every record of the entity.
    fn fetch_request() -> FetchRequest<Self> {
        FetchRequest::new()
    }

    /// Query locating the record with identifier `id`.
    fn fetch_request_for_id(id: &Self::Id) -> FetchRequest<Self> {
        FetchRequest::new().with_predicate(Filter::equals(Self::ENTITY.id_attribute, id))
    }
}

/// Domain model that can be stored as `Self::Record`.
pub trait StoreConvertible: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + Send + Sync + 'static;
    type Record: ModelConvertible<Model = Self>;

    fn id(&self) -> Self::Id;

    /// Builds the record and registers it for insertion in `context`.
    ///
    /// Nothing is written until the context is saved.
    fn convert(&self, context: &mut Context<'_>) -> Self::Record;
}

/// Reads a hyphenated-text uuid column.
pub fn uuid_column(row: &Row<'_>, column: &str) -> DbResult<Uuid> {
    let text: String = row.get(column)?;
    Uuid::parse_str(&text)
        .map_err(|_| DbError::InvalidData(format!("invalid uuid value `{text}` in `{column}`")))
}

/// Reads a 0/1 integer column as a boolean.
pub fn bool_column(row: &Row<'_>, column: &str) -> DbResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DbError::InvalidData(format!(
            "invalid boolean value `{other}` in `{column}`"
        ))),
    }
}
