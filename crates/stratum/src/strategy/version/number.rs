use crate::{mapping::{ColumnConfig, MapContext}, strategy::plan};

use stratum_core::{
    schema::db::Column,
    stmt::{Expr, Type, Value},
    Error, Result,
};

use indexmap::IndexMap;

pub(super) const DEFAULT_COLUMN: &str = "version";

/// Version numbers. A new instance starts at `initial`, every update adds
/// one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberVersion {
    initial: i128,
}

impl NumberVersion {
    pub fn with_initial(initial: i128) -> NumberVersion {
        NumberVersion { initial }
    }

    pub fn initial(&self) -> i128 {
        self.initial
    }

    pub(super) fn next(&self, columns: &[Column], current: &Value) -> Result<Value> {
        let [column] = columns else {
            return Err(Error::invalid_mapping(format!(
                "version number needs one column, got {}",
                columns.len()
            )));
        };

        increment(&column.ty, current, self.initial)
    }
}

impl Default for NumberVersion {
    fn default() -> NumberVersion {
        NumberVersion { initial: 1 }
    }
}

pub(super) fn map(configs: &[ColumnConfig], cx: &MapContext<'_>) -> Result<Vec<Column>> {
    if configs.len() > 1 {
        return Err(Error::invalid_mapping(format!(
            "version number maps to one column, {} configured",
            configs.len()
        )));
    }

    let template = match configs.first() {
        Some(config) => config.template(Type::I32),
        None => Column::new("", Type::I32),
    };

    let columns = plan::columns(vec![template], configs, DEFAULT_COLUMN, cx)?;
    ensure_integers(&columns)?;
    Ok(columns)
}

/// `current + 1` in a column of type `ty`, or `initial` for a new instance.
pub(super) fn increment(ty: &Type, current: &Value, initial: i128) -> Result<Value> {
    match current {
        Value::Null => ty.cast_integer(initial),
        current => match current.as_i128() {
            Some(current) => ty.cast_integer(current + 1),
            None => Err(Error::type_conversion(current.clone(), ty.name())),
        },
    }
}

pub(super) fn ensure_integers(columns: &[Column]) -> Result<()> {
    match columns.iter().find(|column| !column.ty.is_integer()) {
        Some(column) => Err(Error::invalid_mapping(format!(
            "version column `{}` must be an integer, not {}",
            column.name,
            column.ty.name()
        ))),
        None => Ok(()),
    }
}

/// `column = column + 1` for every version column.
pub(super) fn bulk_update_values(columns: &[Column]) -> IndexMap<String, Expr> {
    columns
        .iter()
        .map(|column| {
            (
                column.name.clone(),
                Expr::add(Expr::column(&column.name), Expr::value(1)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_in_the_column_type() {
        assert_eq!(increment(&Type::I32, &Value::Null, 1).unwrap(), Value::I32(1));
        assert_eq!(increment(&Type::I32, &Value::I32(41), 1).unwrap(), Value::I32(42));
        assert_eq!(increment(&Type::I64, &Value::I32(41), 1).unwrap(), Value::I64(42));
        assert_eq!(increment(&Type::I16, &Value::Null, 10).unwrap(), Value::I16(10));
    }

    #[test]
    fn overflow_and_non_integers_fail() {
        assert!(increment(&Type::I8, &Value::I8(i8::MAX), 1).is_err());
        assert!(increment(&Type::I32, &Value::from("7"), 1).is_err());
    }

    #[test]
    fn bulk_adds_one() {
        let columns = [Column::new("version", Type::I32)];
        let values = bulk_update_values(&columns);

        assert_eq!(values.len(), 1);
        assert_eq!(
            values["version"],
            Expr::add(Expr::column("version"), Expr::value(1))
        );
    }
}
