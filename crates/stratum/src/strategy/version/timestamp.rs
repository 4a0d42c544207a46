use super::number::DEFAULT_COLUMN;
use crate::{mapping::{ColumnConfig, MapContext}, strategy::plan};

use stratum_core::{
    schema::db::Column,
    stmt::{Expr, Type, Value},
    Error, Result,
};

use indexmap::IndexMap;

pub(super) fn map(configs: &[ColumnConfig], cx: &MapContext<'_>) -> Result<Vec<Column>> {
    if configs.len() > 1 {
        return Err(Error::invalid_mapping(format!(
            "version timestamp maps to one column, {} configured",
            configs.len()
        )));
    }

    let columns = plan::columns(
        vec![Column::new("", Type::Timestamp)],
        configs,
        DEFAULT_COLUMN,
        cx,
    )?;

    if let Some(column) = configs.first().and_then(|config| config.ty.as_ref()) {
        if *column != Type::Timestamp {
            return Err(Error::invalid_mapping(format!(
                "version timestamp cannot be stored as {}",
                column.name()
            )));
        }
    }

    Ok(columns)
}

pub(super) fn now() -> Value {
    Value::Timestamp(jiff::Timestamp::now())
}

/// Every version column set to one instant, shared by all rows of the bulk
/// update.
pub(super) fn bulk_update_values(columns: &[Column]) -> IndexMap<String, Expr> {
    let now = now();
    columns
        .iter()
        .map(|column| (column.name.clone(), Expr::value(now.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::version::compare_values;
    use std::cmp::Ordering;

    #[test]
    fn later_never_earlier() {
        let t1 = now();
        let t2 = now();
        assert_ne!(compare_values(&t2, &t1), Ordering::Less);
    }

    #[test]
    fn bulk_shares_one_instant() {
        let columns = [
            Column::new("changed_at", Type::Timestamp),
            Column::new("synced_at", Type::Timestamp),
        ];
        let values = bulk_update_values(&columns);
        assert_eq!(values["changed_at"], values["synced_at"]);
    }
}
