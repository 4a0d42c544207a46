use crate::{schema::db::Column, stmt::Value, Result};

use indexmap::IndexMap;

/// A fetched tuple, addressed by column name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResultRow {
    values: IndexMap<String, Value>,
}

impl ResultRow {
    pub fn new() -> ResultRow {
        ResultRow::default()
    }

    /// Adds a column value, returning the row.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> ResultRow {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns `true` if the row carries a value for `column`.
    pub fn contains(&self, column: &Column) -> bool {
        self.values.contains_key(&column.name)
    }

    /// Returns the value of `column`. Selecting a column the row does not
    /// carry is an error.
    pub fn get(&self, column: &Column) -> Result<Value> {
        match self.values.get(&column.name) {
            Some(value) => Ok(value.clone()),
            None => crate::bail!("column `{}` was not selected", column.name),
        }
    }

    /// Returns `true` if `column` was selected and holds SQL `NULL`.
    pub fn was_null(&self, column: &Column) -> bool {
        self.values
            .get(&column.name)
            .is_some_and(|value| value.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stmt::Type;

    #[test]
    fn reads_by_column() {
        let name = Column::new("name", Type::String);
        let nickname = Column::new("nickname", Type::String);
        let missing = Column::new("missing", Type::String);

        let row = ResultRow::new()
            .with("name", "Ada")
            .with("nickname", Value::Null);

        assert_eq!(row.get(&name).unwrap(), Value::from("Ada"));
        assert!(row.was_null(&nickname));
        assert!(!row.was_null(&missing));
        assert!(row.get(&missing).is_err());
    }
}
