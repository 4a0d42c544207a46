use super::is_list_of;
use crate::mapping::ValueMapping;

use stratum_core::{
    schema::db::Column,
    stmt::{Type, Value},
    Error, Result,
};

pub(super) fn plan_columns(value: &ValueMapping) -> Result<Vec<Column>> {
    let ty = value.ty();

    if *ty != Type::Chars && !is_list_of(ty, &Type::Char) {
        return Err(Error::invalid_mapping(format!(
            "character array handler cannot map a value of type {ty:?}"
        )));
    }

    Ok(vec![Column::new("", Type::String)])
}

pub(super) fn to_storage(object: Value) -> Result<Value> {
    match object {
        Value::Null => Ok(Value::Null),
        Value::Chars(chars) => Ok(Value::String(chars.into_iter().collect())),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Char(c) => Ok(c),
                item => Err(Error::type_conversion(item, "Char")),
            })
            .collect::<Result<String>>()
            .map(Value::String),
        object => Err(Error::type_conversion(object, "Chars")),
    }
}

pub(super) fn to_object(value: &ValueMapping, stored: Value) -> Result<Value> {
    match stored {
        Value::Null => Ok(Value::Null),
        Value::String(s) if is_list_of(value.ty(), &Type::Char) => {
            Ok(Value::List(s.chars().map(Value::Char).collect()))
        }
        Value::String(s) => Ok(Value::Chars(s.chars().collect())),
        stored => Err(Error::type_conversion(stored, "String")),
    }
}
