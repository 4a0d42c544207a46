use crate::mapping::{NullValue, ValueMapping};

use stratum_core::{schema::db::Column, stmt::Value, Error, Result};

pub(super) fn plan_columns(value: &ValueMapping) -> Result<Vec<Column>> {
    Ok(vec![Column::new("", value.ty().clone())])
}

/// Writes values as they are. A null bound for a single column without a
/// default literal is replaced by the column type's empty value when the
/// value mapping asks for defaults.
pub(super) fn to_storage(value: &ValueMapping, object: Value) -> Result<Value> {
    if !object.is_null() {
        return Ok(object);
    }

    match value.null_value() {
        NullValue::None => Ok(object),
        NullValue::Exception => Err(Error::invalid_value(format!(
            "null is not allowed for a value of type {}",
            value.ty().name()
        ))),
        NullValue::Default => match &value.columns()?[..] {
            [column] if column.default.is_none() => Ok(column.ty.empty_value()),
            _ => Ok(object),
        },
    }
}
