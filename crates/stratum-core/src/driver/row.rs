use crate::{
    schema::db::{Column, Table},
    stmt::Value,
    Error, Result,
};

use by_address::ByAddress;
use indexmap::IndexMap;
use std::sync::Arc;

/// The kind of mutation a [`Row`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Insert,
    Update,
    Delete,
}

/// A pending mutation against a single table.
///
/// Strategies fill in column values and, for updates and deletes, the
/// conditions identifying the targeted row.
#[derive(Debug, Clone)]
pub struct Row {
    pub table: Arc<Table>,
    pub action: RowAction,
    values: IndexMap<String, Value>,
    conditions: IndexMap<String, Value>,
}

/// Collects the rows produced while flushing one instance.
///
/// There is at most one row per table and action: every strategy writing to
/// the same table contributes to the same row.
#[derive(Debug, Default)]
pub struct RowManager {
    rows: IndexMap<(ByAddress<Arc<Table>>, RowAction), Row>,
}

impl Row {
    pub fn new(table: Arc<Table>, action: RowAction) -> Row {
        Row {
            table,
            action,
            values: IndexMap::new(),
            conditions: IndexMap::new(),
        }
    }

    /// Sets the value of `column`. The value must be storable in the column.
    pub fn set(&mut self, column: &Column, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if !value.is_a(&column.ty) {
            return Err(Error::type_conversion(value, column.ty.name())
                .context(crate::err!("column `{}`", column.name)));
        }

        self.values.insert(column.name.clone(), value);
        Ok(())
    }

    pub fn set_null(&mut self, column: &Column) {
        self.values.insert(column.name.clone(), Value::Null);
    }

    /// Restricts the row to the one where `column` currently holds `value`.
    pub fn where_eq(&mut self, column: &Column, value: impl Into<Value>) -> Result<()> {
        let value = value.into();

        if !value.is_a(&column.ty) {
            return Err(Error::type_conversion(value, column.ty.name())
                .context(crate::err!("condition on column `{}`", column.name)));
        }

        self.conditions.insert(column.name.clone(), value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn condition(&self, name: &str) -> Option<&Value> {
        self.conditions.get(name)
    }

    pub fn values(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn conditions(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.conditions.is_empty()
    }
}

impl RowManager {
    pub fn new() -> RowManager {
        RowManager::default()
    }

    /// Returns the row for `table` and `action`, creating it on first use.
    pub fn row(&mut self, table: &Arc<Table>, action: RowAction) -> &mut Row {
        self.rows
            .entry((ByAddress(table.clone()), action))
            .or_insert_with(|| Row::new(table.clone(), action))
    }

    pub fn get(&self, table: &Arc<Table>, action: RowAction) -> Option<&Row> {
        self.rows.get(&(ByAddress(table.clone()), action))
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &Row> {
        self.rows.values()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
