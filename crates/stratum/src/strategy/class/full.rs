use crate::{
    mapping::{ClassLayout, ClassMapping, Identity, MapContext},
    strategy::plan,
};

use stratum_core::{
    schema::db::Column,
    stmt::Type,
    Error, Result,
};

use std::sync::Arc;

/// Gives the class a table of its own.
///
/// The primary key comes from configured columns, else from the primary key
/// fields of the hierarchy, else from a datastore `id` column.
pub(super) fn map(
    cls: &ClassMapping,
    fields: &[Arc<[Column]>],
    cx: &mut MapContext<'_>,
) -> Result<ClassLayout> {
    if cls.embedding().is_some() {
        return Err(Error::invalid_mapping(format!(
            "class `{}` is embedded and cannot have a table of its own",
            cls.name()
        )));
    }

    let name = match cls.table_name() {
        Some(name) => name.to_string(),
        None => cx.default_table_name(cls),
    };
    let table = cx.resolve_table(&name)?;

    let mut key_fields = vec![];
    for ancestor in cls.ancestors().collect::<Vec<_>>().into_iter().rev() {
        for field in ancestor.fields().iter().filter(|f| f.is_primary_key()) {
            key_fields.extend(field.columns()?.iter().cloned());
        }
    }
    for (field, columns) in cls.fields().iter().zip(fields) {
        if field.is_primary_key() {
            key_fields.extend(columns.iter().cloned());
        }
    }

    let configs = cls.primary_key_configs();

    let (identity, primary_key) = if !configs.is_empty() {
        let templates = configs.iter().map(|c| c.template(Type::I64)).collect();
        let identity = match cls.identity() {
            Identity::Unknown => Identity::Datastore,
            identity => identity,
        };
        (identity, plan::columns(templates, configs, "id", cx)?)
    } else if !key_fields.is_empty() {
        if cls.identity() == Identity::Datastore {
            return Err(Error::invalid_mapping(format!(
                "class `{}` uses datastore identity but declares primary key fields",
                cls.name()
            )));
        }
        (Identity::Application, key_fields)
    } else if cls.identity() == Identity::Application {
        return Err(Error::invalid_mapping(format!(
            "class `{}` uses application identity but declares no primary key fields",
            cls.name()
        )));
    } else {
        let id = plan::column(Column::new("id", Type::I64).not_null(), None, "id", cx)?;
        (Identity::Datastore, vec![id])
    };

    Ok(ClassLayout {
        identity,
        oid_ty: cls.oid_ty().cloned(),
        table: Some(table),
        primary_key: primary_key.into(),
        io: Arc::new(cls.io().clone()),
    })
}
