use super::{Table, TableId};
use crate::{Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// The set of known tables, keyed by name.
///
/// Name lookups are case-insensitive, matching how most databases resolve
/// unquoted identifiers.
#[derive(Debug, Default)]
pub struct Schema {
    tables: IndexMap<String, Arc<Table>>,
}

impl Schema {
    pub fn new() -> Schema {
        Schema::default()
    }

    pub fn table(&self, name: &str) -> Option<&Arc<Table>> {
        self.tables.get(&name.to_ascii_lowercase())
    }

    pub fn tables(&self) -> impl Iterator<Item = &Arc<Table>> {
        self.tables.values()
    }

    /// Declares a table, returning the existing one if the name is known.
    pub fn add_table(&mut self, name: &str) -> Arc<Table> {
        let key = name.to_ascii_lowercase();
        let id = TableId(self.tables.len());

        self.tables
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Table {
                    id,
                    name: name.to_string(),
                })
            })
            .clone()
    }

    /// Resolves `name` to a table. When `adapt` is set a missing table is
    /// created; otherwise it is a mapping error.
    pub fn resolve_table(&mut self, name: &str, adapt: bool) -> Result<Arc<Table>> {
        if let Some(table) = self.table(name) {
            return Ok(table.clone());
        }

        if !adapt {
            return Err(Error::invalid_mapping(format!(
                "table `{name}` does not exist and the schema may not be adapted"
            )));
        }

        Ok(self.add_table(name))
    }
}
