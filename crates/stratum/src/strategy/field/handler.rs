use crate::{
    mapping::{ClassMapping, FieldMapping, MapContext},
    strategy::{codec::ValueHandler, plan},
};

use stratum_core::{
    driver::{ResultRow, RowAction, RowManager},
    schema::db::Column,
    stmt::Value,
    Error, Result, StateManager, Store,
};

pub(super) fn map(field: &FieldMapping, cx: &mut MapContext<'_>) -> Result<Vec<Column>> {
    let value = field.value();
    let templates = handler(field)?.plan_columns(value, cx)?;
    plan::columns(templates, value.column_configs(), field.name(), cx)
}

pub(super) fn write(
    cls: &ClassMapping,
    field: &FieldMapping,
    sm: &dyn StateManager,
    rows: &mut RowManager,
    action: RowAction,
) -> Result<()> {
    let columns = field.columns()?;
    let stored = handler(field)?.to_storage(field.value(), sm.fetch(field.index()))?;
    let values = split_values(columns, stored)?;

    let row = rows.row(cls.table()?, action);
    for (i, (column, value)) in columns.iter().zip(values).enumerate() {
        let writable = match action {
            RowAction::Insert => field.io().is_insertable(i),
            _ => field.io().is_updatable(i),
        };

        if writable {
            row.set(column, value)?;
        }
    }

    Ok(())
}

pub(super) async fn load(
    field: &FieldMapping,
    sm: &mut dyn StateManager,
    store: &dyn Store,
    result: &ResultRow,
) -> Result<()> {
    let columns = field.columns()?;
    if columns.is_empty() || !columns.iter().all(|column| result.contains(column)) {
        return Ok(());
    }

    let stored = join_values(columns, result)?;
    let object = handler(field)?
        .to_object_loaded(field.value(), stored, &*sm, store)
        .await?;

    sm.store(field.index(), object);
    Ok(())
}

fn handler(field: &FieldMapping) -> Result<&ValueHandler> {
    field.value().handler().ok_or_else(|| {
        Error::invalid_mapping(format!(
            "field `{}` of type {} has no value handler",
            field.name(),
            field.value().ty().name()
        ))
    })
}

/// Splits a stored value into one value per column. Values spanning several
/// columns are records.
pub(crate) fn split_values(columns: &[Column], stored: Value) -> Result<Vec<Value>> {
    if columns.len() == 1 {
        return Ok(vec![stored]);
    }

    match stored {
        Value::Null => Ok(vec![Value::Null; columns.len()]),
        Value::Record(fields) if fields.len() == columns.len() => Ok(fields),
        stored => Err(Error::invalid_value(format!(
            "expected a record of {} values, got {}",
            columns.len(),
            stored.kind_name()
        ))),
    }
}

/// The inverse of [`split_values`].
pub(crate) fn join_values(columns: &[Column], result: &ResultRow) -> Result<Value> {
    match columns {
        [column] => result.get(column),
        columns => Ok(Value::record_from_vec(
            columns
                .iter()
                .map(|column| result.get(column))
                .collect::<Result<Vec<_>>>()?,
        )),
    }
}
