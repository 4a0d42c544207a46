use crate::{
    mapping::{ClassLayout, ClassMapping, MapContext},
    strategy::plan,
};

use stratum_core::{
    driver::{Join, JoinKind, Joins},
    Error, Result,
};

use std::sync::Arc;

/// Gives a subclass its own table whose primary key mirrors, and joins to,
/// the superclass's primary key.
pub(super) fn map(cls: &ClassMapping, cx: &mut MapContext<'_>) -> Result<ClassLayout> {
    let Some(superclass) = cls.superclass() else {
        return Err(Error::invalid_mapping(format!(
            "vertical class `{}` has no persistent superclass",
            cls.name()
        )));
    };

    if cls.embedding().is_some() {
        return Err(Error::invalid_mapping(format!(
            "vertical class `{}` cannot be embedded",
            cls.name()
        )));
    }

    let sup = superclass.layout()?;
    let sup_table = superclass.table()?;

    let name = match cls.table_name() {
        Some(name) => name.to_string(),
        None => cx.default_table_name(cls),
    };
    let table = cx.resolve_table(&name)?;

    if Arc::ptr_eq(&table, sup_table) {
        return Err(Error::invalid_mapping(format!(
            "vertical class `{}` must not share table `{}` with its superclass `{}`",
            cls.name(),
            table.name,
            superclass.name()
        )));
    }

    let configs = cls.primary_key_configs();
    let primary_key = sup
        .primary_key
        .iter()
        .enumerate()
        .map(|(i, column)| plan::column(column.clone(), configs.get(i), &column.name, cx))
        .collect::<Result<Vec<_>>>()?;

    Ok(ClassLayout {
        identity: sup.identity,
        oid_ty: sup.oid_ty.clone(),
        table: Some(table),
        primary_key: primary_key.into(),
        io: Arc::new(cls.io().clone()),
    })
}

pub(super) fn join_superclass(cls: &ClassMapping, joins: Joins, to_this: bool) -> Result<Joins> {
    let Some(superclass) = cls.superclass() else {
        return Ok(joins);
    };

    let table = cls.table()?;
    let primary_key = cls.primary_key()?;
    let sup_table = superclass.table()?;
    let sup_primary_key = superclass.primary_key()?;

    let join = if to_this {
        Join::on_columns(JoinKind::Inner, sup_table, sup_primary_key, table, primary_key)
    } else {
        Join::on_columns(JoinKind::Inner, table, primary_key, sup_table, sup_primary_key)
    };

    superclass
        .strategy()
        .join_superclass(superclass, joins.join(join), to_this)
}
