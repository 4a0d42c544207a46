//! Derives physical columns from column templates and configured overrides.

use crate::mapping::{ColumnConfig, MapContext};

use stratum_core::{
    schema::db::{self, Column},
    Error, Result,
};

/// Resolves the columns of a value.
///
/// `templates` come from the value's codec or owner and fix each column's
/// type. Configured overrides are matched by position. Unnamed columns are
/// named after `default_name`, suffixed by position when there are several.
pub fn columns(
    templates: Vec<Column>,
    configs: &[ColumnConfig],
    default_name: &str,
    cx: &MapContext<'_>,
) -> Result<Vec<Column>> {
    if configs.len() > templates.len() {
        return Err(Error::invalid_mapping(format!(
            "{} columns configured for `{default_name}` but its value maps to {}",
            configs.len(),
            templates.len()
        )));
    }

    let multi = templates.len() > 1;

    templates
        .into_iter()
        .enumerate()
        .map(|(i, template)| {
            let name = if multi {
                format!("{default_name}_{i}")
            } else {
                default_name.to_string()
            };
            column(template, configs.get(i), &name, cx)
        })
        .collect()
}

/// Resolves a single column.
pub fn column(
    template: Column,
    config: Option<&ColumnConfig>,
    default_name: &str,
    cx: &MapContext<'_>,
) -> Result<Column> {
    let mut column = template;
    let mut hint = None;

    if let Some(config) = config {
        if let Some(name) = &config.name {
            column.name = name.clone();
        }
        if let Some(size) = config.size {
            column.size = Some(size);
        }
        if let Some(nullable) = config.nullable {
            column.nullable = nullable;
        }
        if let Some(default) = &config.default {
            column.default = Some(default.clone());
        }
        hint = config.storage_ty.as_ref();
    }

    if column.name.is_empty() {
        column.name = default_name.to_string();
    }

    column.storage_ty = db::Type::from_app(
        &column.ty,
        column.size,
        hint,
        &cx.dictionary().storage_types,
    )
    .map_err(|e| e.context(stratum_core::err!("column `{}`", column.name)))?;

    Ok(column)
}
