use super::ColumnConfig;
use crate::strategy::version::VersionStrategy;

use stratum_core::{schema::db::Column, Error, Result};

use std::sync::{Arc, OnceLock};

/// Optimistic version metadata of a class.
#[derive(Debug)]
pub struct Version {
    strategy: VersionStrategy,
    columns: Vec<ColumnConfig>,
    field: Option<usize>,
    resolved: OnceLock<Arc<[Column]>>,
}

impl Version {
    pub(crate) fn new(
        strategy: VersionStrategy,
        columns: Vec<ColumnConfig>,
        field: Option<usize>,
    ) -> Version {
        Version {
            strategy,
            columns,
            field,
            resolved: OnceLock::new(),
        }
    }

    pub fn strategy(&self) -> &VersionStrategy {
        &self.strategy
    }

    pub fn column_configs(&self) -> &[ColumnConfig] {
        &self.columns
    }

    /// Index of the field the version is mirrored into, if any.
    pub fn field(&self) -> Option<usize> {
        self.field
    }

    /// The version columns. Empty when the class declares no version of its
    /// own.
    pub fn columns(&self) -> Result<&Arc<[Column]>> {
        self.resolved
            .get()
            .ok_or_else(|| Error::invalid_mapping("version has not been mapped"))
    }

    pub(crate) fn commit(&self, columns: Arc<[Column]>) {
        let _ = self.resolved.set(columns);
    }
}
