use crate::mapping::ValueMapping;

use stratum_core::{
    schema::db::Column,
    stmt::{Type, Value},
    Error, Result,
};

/// A single unsized string column. Oversized payloads are routed by the
/// field strategy, not here.
pub(super) fn plan_columns(value: &ValueMapping) -> Result<Vec<Column>> {
    if !value.ty().is_string() {
        return Err(Error::invalid_mapping(format!(
            "clob handler cannot map a value of type {:?}",
            value.ty()
        )));
    }

    Ok(vec![Column::new("", Type::String)])
}

pub(super) fn convert(value: Value) -> Result<Value> {
    match value {
        Value::Null | Value::String(_) => Ok(value),
        value => Err(Error::type_conversion(value, "String")),
    }
}
