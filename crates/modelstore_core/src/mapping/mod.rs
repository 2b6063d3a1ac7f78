//! Value conversion and explicit model-to-record field mapping.
//!
//! # Responsibility
//! - Convert Rust values into storable SQLite values (`FieldValue`).
//! - Run the transform step for values stored in serialized form.
//! - Declare, per model/record pair, which attributes `update` writes.
//!
//! # Invariants
//! - `Value::Null` produced by a mapped field means "leave unchanged".
//! - A mapping is validated against its entity before any client uses it.

mod field_mapping;
mod field_value;
mod transform;

pub use field_mapping::{FieldMapping, MappingError};
pub use field_value::FieldValue;
pub use transform::{Json, Transformable, TransformError};
