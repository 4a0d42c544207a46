use super::is_list_of;
use crate::mapping::ValueMapping;

use stratum_core::{
    schema::db::Column,
    stmt::{Type, Value},
    Error, Result,
};

pub(super) fn plan_columns(value: &ValueMapping) -> Result<Vec<Column>> {
    let ty = value.ty();

    if *ty != Type::Bytes && !is_list_of(ty, &Type::U8) {
        return Err(Error::invalid_mapping(format!(
            "byte array handler cannot map a value of type {ty:?}"
        )));
    }

    Ok(vec![Column::new("", Type::Bytes)])
}

pub(super) fn to_storage(object: Value) -> Result<Value> {
    match object {
        Value::Null | Value::Bytes(_) => Ok(object),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::U8(byte) => Ok(byte),
                item => Err(Error::type_conversion(item, "U8")),
            })
            .collect::<Result<Vec<_>>>()
            .map(Value::Bytes),
        object => Err(Error::type_conversion(object, "Bytes")),
    }
}

/// Restores boxed elements when the value declares a list of bytes.
pub(super) fn to_object(value: &ValueMapping, stored: Value) -> Result<Value> {
    match stored {
        Value::Null => Ok(Value::Null),
        Value::Bytes(bytes) if is_list_of(value.ty(), &Type::U8) => {
            Ok(Value::List(bytes.into_iter().map(Value::U8).collect()))
        }
        Value::Bytes(_) => Ok(stored),
        stored => Err(Error::type_conversion(stored, "Bytes")),
    }
}
