//! Embedded classes and the null-indicator contract of their embedding.
//!
//! An embedded class has no physical identity: it borrows everything from
//! the class owning it. When the embedding field maps to exactly one
//! column, that column tells whether the embedded instance exists.

use crate::mapping::{ClassLayout, ClassMapping};

use stratum_core::{schema::db::Column, stmt::Value, Error, Result};

pub(super) fn map(cls: &ClassMapping) -> Result<ClassLayout> {
    let Some(embedding) = cls.embedding() else {
        return Err(Error::invalid_mapping(format!(
            "embedded class `{}` has no embedding field",
            cls.name()
        )));
    };

    let field = embedding.field();
    if *field.value().ty() != cls.ty() {
        return Err(Error::invalid_mapping(format!(
            "embedded class `{}` does not match type {:?} of `{}.{}`",
            cls.name(),
            field.value().ty(),
            embedding.owner().name(),
            field.name()
        )));
    }

    Ok(embedding.resolved_owner().layout()?.clone())
}

/// Returns `true` if `value`, read from the indicator column, stands for an
/// absent embedded instance: SQL `NULL`, the column type's empty value on a
/// `NOT NULL` column, or the column's default literal.
///
/// Without exactly one column there is no indicator and nothing is null.
pub fn indicates_null(columns: &[Column], value: &Value) -> bool {
    let [column] = columns else {
        return false;
    };

    if value.is_null() {
        return true;
    }

    if column.is_not_null() && *value == column.ty.empty_value() {
        return true;
    }

    match (&column.default, literal(value)) {
        (Some(default), Some(literal)) => *default == literal,
        _ => false,
    }
}

/// The indicator value to write for an embedded instance that is `present`
/// or absent. `None` without exactly one column.
pub fn null_indicator_value(columns: &[Column], present: bool) -> Option<Value> {
    let [column] = columns else {
        return None;
    };

    Some(if present {
        column.ty.non_empty_value()
    } else if column.nullable {
        Value::Null
    } else {
        column.ty.empty_value()
    })
}

/// How a value is spelled as a column default.
fn literal(value: &Value) -> Option<String> {
    match value {
        Value::String(v) | Value::Locale(v) => Some(v.clone()),
        Value::Char(v) => Some(v.to_string()),
        Value::Bool(v) => Some(v.to_string()),
        Value::F32(v) => Some(v.to_string()),
        Value::F64(v) => Some(v.to_string()),
        value => value.as_i128().map(|v| v.to_string()),
    }
}
