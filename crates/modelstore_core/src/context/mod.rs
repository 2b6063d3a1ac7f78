//! Persistence contexts and the container handing them out.
//!
//! # Responsibility
//! - Run fetch requests against committed store state.
//! - Collect inserts, deletes and attribute assignments as pending changes.
//! - Apply pending changes atomically on `save`.
//!
//! # Invariants
//! - Nothing is written before `save`.
//! - `save` applies changes in registration order inside one transaction;
//!   on failure the transaction rolls back and the changes are discarded.
//! - A delete or assignment whose row is gone by save time fails the save.

mod container;

pub use container::PersistentContainer;

use crate::convert::{EntityDescription, ModelConvertible};
use crate::db::{DbError, DbResult};
use crate::mapping::FieldValue;
use crate::query::{quote_identifier, FetchRequest};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq)]
enum PendingChange {
    Insert {
        entity: EntityDescription,
        values: Vec<(&'static str, Value)>,
    },
    Delete {
        entity: EntityDescription,
        id: Value,
    },
    SetValue {
        entity: EntityDescription,
        id: Value,
        attribute: String,
        value: Value,
    },
}

impl PendingChange {
    fn apply(&self, conn: &Connection) -> DbResult<()> {
        let affected = match self {
            Self::Insert { entity, values } => {
                let columns = values
                    .iter()
                    .map(|(attribute, _)| quote_identifier(attribute))
                    .collect::<Vec<_>>()
                    .join(", ");
                let placeholders = vec!["?"; values.len()].join(", ");
                conn.execute(
                    &format!(
                        "INSERT INTO {} ({columns}) VALUES ({placeholders});",
                        quote_identifier(entity.name)
                    ),
                    params_from_iter(values.iter().map(|(_, value)| value)),
                )
            }
            Self::Delete { entity, id } => conn.execute(
                &format!(
                    "DELETE FROM {} WHERE {} = ?1;",
                    quote_identifier(entity.name),
                    quote_identifier(entity.id_attribute)
                ),
                [id],
            ),
            Self::SetValue {
                entity,
                id,
                attribute,
                value,
            } => conn.execute(
                &format!(
                    "UPDATE {} SET {} = ?1 WHERE {} = ?2;",
                    quote_identifier(entity.name),
                    quote_identifier(attribute),
                    quote_identifier(entity.id_attribute)
                ),
                [value, id],
            ),
        }?;

        match self {
            Self::Delete { entity, .. } | Self::SetValue { entity, .. } if affected == 0 => {
                Err(DbError::RecordNotFound {
                    entity: entity.name,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Scoped handle through which records are read and written.
pub struct Context<'conn> {
    conn: &'conn mut Connection,
    pending: Vec<PendingChange>,
}

impl<'conn> Context<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self {
            conn,
            pending: Vec::new(),
        }
    }

    /// Runs `request` and decodes every returned row, in engine order.
    pub fn fetch<R: ModelConvertible>(&self, request: &FetchRequest<R>) -> DbResult<Vec<R>> {
        let (sql, params) = request.to_sql();
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(R::from_row(row)?);
        }

        Ok(records)
    }

    /// Registers `record` for insertion.
    pub fn insert<R: ModelConvertible>(&mut self, record: &R) {
        self.pending.push(PendingChange::Insert {
            entity: R::ENTITY,
            values: record.values(),
        });
    }

    /// Registers removal of the stored row backing `record`.
    pub fn delete<R: ModelConvertible>(&mut self, record: &R) {
        self.pending.push(PendingChange::Delete {
            entity: R::ENTITY,
            id: record.id().to_value(),
        });
    }

    /// Registers an assignment of `value` to `attribute` on `record`'s row.
    ///
    /// # Errors
    /// - `UnknownAttribute` when the entity does not declare `attribute`.
    pub fn set_value<R: ModelConvertible>(
        &mut self,
        record: &R,
        attribute: &str,
        value: Value,
    ) -> DbResult<()> {
        if !R::ENTITY.has_attribute(attribute) {
            return Err(DbError::UnknownAttribute {
                entity: R::ENTITY.name,
                attribute: attribute.to_string(),
            });
        }

        self.pending.push(PendingChange::SetValue {
            entity: R::ENTITY,
            id: record.id().to_value(),
            attribute: attribute.to_string(),
            value,
        });
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Discards every pending change.
    pub fn rollback(&mut self) {
        self.pending.clear();
    }

    /// Applies pending changes in one transaction and commits.
    ///
    /// Saving with no pending changes is a no-op.
    pub fn save(&mut self) -> DbResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let started_at = Instant::now();
        let changes = std::mem::take(&mut self.pending);

        let result = (|| -> DbResult<()> {
            let tx = self.conn.transaction()?;
            for change in &changes {
                change.apply(&tx)?;
            }
            tx.commit()?;
            Ok(())
        })();

        match &result {
            Ok(()) => debug!(
                "event=context_save module=context status=ok changes={} duration_ms={}",
                changes.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=context_save module=context status=error changes={} duration_ms={} error={}",
                changes.len(),
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }

    /// Raw connection access for schema setup or ad-hoc queries.
    pub fn connection(&self) -> &Connection {
        &*self.conn
    }
}
