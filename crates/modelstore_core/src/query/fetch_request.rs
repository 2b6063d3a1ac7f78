use super::{quote_identifier, Filter, SortDescriptor};
use crate::convert::{EntityDescription, ModelConvertible};
use rusqlite::types::Value;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// Declarative query over the records of `R`.
pub struct FetchRequest<R> {
    predicate: Option<Filter>,
    sort_descriptors: Vec<SortDescriptor>,
    limit: Option<u32>,
    offset: u32,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for FetchRequest<R> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            sort_descriptors: self.sort_descriptors.clone(),
            limit: self.limit,
            offset: self.offset,
            _record: PhantomData,
        }
    }
}

impl<R> Debug for FetchRequest<R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("predicate", &self.predicate)
            .field("sort_descriptors", &self.sort_descriptors)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<R> Default for FetchRequest<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> FetchRequest<R> {
    pub fn new() -> Self {
        Self {
            predicate: None,
            sort_descriptors: Vec::new(),
            limit: None,
            offset: 0,
            _record: PhantomData,
        }
    }

    /// Replaces the predicate.
    pub fn with_predicate(mut self, predicate: Filter) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Adds `filter` as an extra conjunct of the current predicate.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.predicate = Some(match self.predicate.take() {
            None => filter,
            Some(Filter::And(mut filters)) => {
                filters.push(filter);
                Filter::And(filters)
            }
            Some(existing) => Filter::And(vec![existing, filter]),
        });
        self
    }

    /// Appends a sort key; earlier keys take precedence.
    pub fn sorted_by(mut self, sort_descriptor: SortDescriptor) -> Self {
        self.sort_descriptors.push(sort_descriptor);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn predicate(&self) -> Option<&Filter> {
        self.predicate.as_ref()
    }

    pub fn sort_descriptors(&self) -> &[SortDescriptor] {
        &self.sort_descriptors
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    fn render(&self, entity: &EntityDescription) -> (String, Vec<Value>) {
        let columns = entity
            .attributes
            .iter()
            .map(|attribute| quote_identifier(attribute))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {columns} FROM {}", quote_identifier(entity.name));
        let mut params = Vec::new();

        if let Some(predicate) = &self.predicate {
            let (where_sql, where_params) = predicate.predicate().into_parts();
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params.extend(where_params);
        }

        if !self.sort_descriptors.is_empty() {
            let terms = self
                .sort_descriptors
                .iter()
                .map(SortDescriptor::order_term)
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms);
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                params.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            params.push(Value::Integer(i64::from(self.offset)));
        }

        (sql, params)
    }
}

impl<R: ModelConvertible> FetchRequest<R> {
    pub fn entity(&self) -> EntityDescription {
        R::ENTITY
    }

    /// Renders the `SELECT` statement and its bound parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        self.render(&R::ENTITY)
    }
}
