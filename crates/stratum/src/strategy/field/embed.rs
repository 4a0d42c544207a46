//! The null indicator of an embedded instance. The embedded class's own
//! fields are written by that class; this field only tells whether an
//! instance is there at all.

use crate::{
    mapping::{ClassMapping, FieldMapping, MapContext},
    strategy::{class::embedded, plan},
};

use stratum_core::{
    driver::{ResultRow, RowAction, RowManager},
    schema::db::Column,
    stmt::Value,
    Error, Result, StateManager,
};

pub(super) fn map(field: &FieldMapping, cx: &mut MapContext<'_>) -> Result<Vec<Column>> {
    let configs = field.value().column_configs();

    let templates = configs
        .iter()
        .map(|config| match &config.ty {
            Some(ty) => Ok(config.template(ty.clone())),
            None => Err(Error::invalid_mapping(
                "null-indicator columns of an embedded field must declare a type",
            )),
        })
        .collect::<Result<Vec<_>>>()?;

    plan::columns(templates, configs, field.name(), cx)
}

pub(super) fn write(
    cls: &ClassMapping,
    field: &FieldMapping,
    sm: &dyn StateManager,
    rows: &mut RowManager,
    action: RowAction,
) -> Result<()> {
    let columns = field.columns()?;
    let present = !sm.fetch(field.index()).is_null();

    let Some(indicator) = embedded::null_indicator_value(columns, present) else {
        return Ok(());
    };

    let writable = match action {
        RowAction::Insert => field.io().is_insertable(0),
        _ => field.io().is_updatable(0),
    };

    if writable {
        rows.row(cls.table()?, action).set(&columns[0], indicator)?;
    }

    Ok(())
}

pub(super) fn load(field: &FieldMapping, sm: &mut dyn StateManager, result: &ResultRow) -> Result<()> {
    let columns = field.columns()?;
    let [column] = &columns[..] else {
        return Ok(());
    };

    if result.contains(column) && embedded::indicates_null(columns, &result.get(column)?) {
        sm.store(field.index(), Value::Null);
    }

    Ok(())
}
