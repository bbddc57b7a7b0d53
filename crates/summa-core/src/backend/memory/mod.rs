//! Module: backend::memory
//! Responsibility: in-memory tables and a reference executor for
//! `GroupedFetch` with SQL null semantics.
//! Does not own: persistence, indexing, or concurrency control.

mod eval;
mod exec;

#[cfg(test)]
mod tests;

use crate::{
    model::EntityModel,
    relation::{Backend, BackendError, FetchOutput, GroupedFetch},
    value::Value,
};
use exec::TableLookup;
use std::{cell::Cell, collections::BTreeMap};

///
/// Table
///
/// Rows stored positionally, aligned with the entity's field list.
///

#[derive(Debug)]
pub(crate) struct Table {
    entity: &'static EntityModel,
    records: Vec<Vec<Value>>,
    next_key: i64,
}

impl Table {
    const fn new(entity: &'static EntityModel) -> Self {
        Self {
            entity,
            records: Vec::new(),
            next_key: 1,
        }
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &Vec<Value>> {
        self.records.iter()
    }

    pub(crate) fn column_index(&self, name: &str) -> Result<usize, BackendError> {
        self.entity
            .fields
            .iter()
            .position(|field| field.name == name)
            .ok_or_else(|| BackendError::UnknownColumn {
                column: format!("{}.{name}", self.entity.table),
            })
    }
}

///
/// MemoryBackend
///
/// Single-threaded in-memory backend. Counts executed fetches so callers can
/// observe batching.
///

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: BTreeMap<&'static str, Table>,
    fetches: Cell<u64>,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the table backing `entity`; re-registering is a no-op.
    pub fn register(&mut self, entity: &'static EntityModel) -> &mut Self {
        self.tables
            .entry(entity.table)
            .or_insert_with(|| Table::new(entity));
        self
    }

    /// Insert one row and return its primary key.
    ///
    /// Omitted columns are stored as `Null`; an omitted primary key is
    /// assigned from the table's integer sequence.
    pub fn insert<'a>(
        &mut self,
        entity: &'static EntityModel,
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Value, BackendError> {
        let table = self
            .tables
            .get_mut(entity.table)
            .ok_or_else(|| BackendError::UnknownTable {
                table: entity.table.to_string(),
            })?;

        let mut record = vec![Value::Null; entity.fields.len()];
        for (name, value) in values {
            let at = table.column_index(name)?;
            record[at] = value;
        }

        let pk_at = table.column_index(entity.primary_key)?;
        if record[pk_at].is_null() {
            record[pk_at] = Value::Int(table.next_key);
            table.next_key += 1;
        } else if let Value::Int(key) = record[pk_at] {
            table.next_key = table.next_key.max(key.saturating_add(1));
        }

        for (field, value) in entity.fields.iter().zip(&record) {
            if !field.accepts(value) {
                return Err(BackendError::InvalidValue {
                    column: field.name.to_string(),
                    value: value.clone(),
                });
            }
        }

        let key = record[pk_at].clone();
        table.records.push(record);

        Ok(key)
    }

    /// Number of fetches executed so far.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.get()
    }

    pub fn reset_fetch_count(&self) {
        self.fetches.set(0);
    }
}

impl TableLookup for MemoryBackend {
    fn table(&self, entity: &EntityModel) -> Result<&Table, BackendError> {
        self.tables
            .get(entity.table)
            .ok_or_else(|| BackendError::UnknownTable {
                table: entity.table.to_string(),
            })
    }
}

impl Backend for MemoryBackend {
    fn fetch(&self, fetch: &GroupedFetch) -> Result<FetchOutput, BackendError> {
        self.fetches.set(self.fetches.get() + 1);
        exec::execute(self, fetch)
    }
}
