use super::number;
use crate::{mapping::{ColumnConfig, MapContext}, strategy::plan};

use stratum_core::{
    schema::db::Column,
    stmt::{Type, Value},
    Error, Result,
};

use std::sync::{Arc, OnceLock};

/// A vector of version numbers, one per column. Each slot starts at its own
/// initial value and is incremented independently; the vector never changes
/// length.
#[derive(Debug, Clone, Default)]
pub struct MultiColumnVersion {
    /// Initial value per slot. Empty means 1 everywhere.
    initial: Vec<i128>,

    /// Column types, captured when mapped.
    types: OnceLock<Arc<[Type]>>,
}

impl MultiColumnVersion {
    pub fn with_initial(initial: Vec<i128>) -> MultiColumnVersion {
        MultiColumnVersion {
            initial,
            types: OnceLock::new(),
        }
    }

    /// The type of each slot, once mapped.
    pub fn types(&self) -> Option<&[Type]> {
        self.types.get().map(|types| &types[..])
    }

    pub(super) fn map(&self, configs: &[ColumnConfig], cx: &MapContext<'_>) -> Result<Vec<Column>> {
        if configs.is_empty() {
            return Err(Error::invalid_mapping(
                "version numbers need at least one configured column",
            ));
        }

        if !self.initial.is_empty() && self.initial.len() != configs.len() {
            return Err(Error::invalid_mapping(format!(
                "{} initial values for {} version columns",
                self.initial.len(),
                configs.len()
            )));
        }

        let templates = configs
            .iter()
            .map(|config| config.template(Type::I32))
            .collect();
        let columns = plan::columns(templates, configs, number::DEFAULT_COLUMN, cx)?;
        number::ensure_integers(&columns)?;

        self.types
            .get_or_init(|| columns.iter().map(|column| column.ty.clone()).collect());

        Ok(columns)
    }

    pub(super) fn next(&self, current: &Value) -> Result<Value> {
        let types = self
            .types()
            .ok_or_else(|| Error::invalid_mapping("version numbers used before being mapped"))?;

        let next = match current {
            Value::Null => types
                .iter()
                .enumerate()
                .map(|(i, ty)| ty.cast_integer(self.initial(i)))
                .collect::<Result<Vec<_>>>()?,
            Value::Record(slots) if slots.len() == types.len() => slots
                .iter()
                .zip(types)
                .enumerate()
                .map(|(i, (slot, ty))| number::increment(ty, slot, self.initial(i)))
                .collect::<Result<Vec<_>>>()?,
            current => {
                return Err(Error::invalid_value(format!(
                    "expected {} version numbers, got {}",
                    types.len(),
                    current.kind_name()
                )))
            }
        };

        Ok(Value::record_from_vec(next))
    }

    fn initial(&self, slot: usize) -> i128 {
        self.initial.get(slot).copied().unwrap_or(1)
    }
}
