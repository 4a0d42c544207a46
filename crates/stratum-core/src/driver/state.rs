use crate::stmt::Value;

use std::{fmt, sync::Arc};

/// The persistent identity of a managed instance: its class and key.
///
/// Compound keys are carried as a [`Value::Record`], one field per primary
/// key column.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectId {
    pub class: Arc<str>,
    pub key: Value,
}

/// Handle on one managed instance, provided by the persistence engine.
///
/// Fields are addressed by their index in the owning class mapping.
pub trait StateManager: Send + Sync {
    /// A description of the managed instance, used in diagnostics.
    fn managed_instance(&self) -> String;

    /// Name of the instance's mapped class.
    fn class_name(&self) -> &str;

    fn object_id(&self) -> Option<&ObjectId>;

    fn set_object_id(&mut self, id: ObjectId);

    /// Returns the current value of a field, `Null` when unset.
    fn fetch(&self, field: usize) -> Value;

    /// Returns the current value of a string field.
    fn fetch_string(&self, field: usize) -> Option<String> {
        match self.fetch(field) {
            Value::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns `true` if the field's value is known without a fetch.
    fn is_loaded(&self, field: usize) -> bool;

    fn store(&mut self, field: usize, value: Value);

    /// The version the instance was loaded with, `Null` when new.
    fn version(&self) -> Value;

    fn set_version(&mut self, version: Value);

    /// Records the version the instance will carry once the flush commits.
    fn set_next_version(&mut self, version: Value);
}

impl ObjectId {
    pub fn new(class: impl Into<Arc<str>>, key: impl Into<Value>) -> ObjectId {
        ObjectId {
            class: class.into(),
            key: key.into(),
        }
    }

    /// The key split into one value per primary key column.
    pub fn key_values(&self) -> &[Value] {
        match &self.key {
            Value::Record(fields) => fields,
            key => std::slice::from_ref(key),
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-", self.class)?;

        for (i, value) in self.key_values().iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            fmt_key(value, f)?;
        }

        Ok(())
    }
}

fn fmt_key(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::String(v) | Value::Locale(v) => f.write_str(v),
        Value::Timestamp(v) => write!(f, "{v}"),
        Value::Date(v) => write!(f, "{v}"),
        Value::Char(v) => write!(f, "{v}"),
        Value::Bool(v) => write!(f, "{v}"),
        value => match value.as_i128() {
            Some(v) => write!(f, "{v}"),
            None => write!(f, "{value:?}"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(ObjectId::new("Draft", 7i64).to_string(), "Draft-7");

        let compound = ObjectId::new(
            "LineItem",
            Value::record_from_vec(vec![Value::from(12i64), Value::from("A")]),
        );
        assert_eq!(compound.to_string(), "LineItem-12:A");
        assert_eq!(compound.key_values().len(), 2);
    }
}
