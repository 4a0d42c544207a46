use crate::{
    mapping::{ClassMapping, ColumnConfig, Discriminator, MapContext, Repository},
    strategy::plan,
};

use stratum_core::{
    driver::{ResultRow, RowAction, RowManager},
    schema::db::Column,
    stmt::{Expr, Type},
    Error, Result,
};

use std::sync::Arc;

const DEFAULT_COLUMN: &str = "dtype";

/// Literals are class names unless configured, so the default column is
/// sized for a typical class name.
const DEFAULT_SIZE: u64 = 31;

pub(super) fn map(config: Option<&ColumnConfig>, cx: &MapContext<'_>) -> Result<Vec<Column>> {
    let mut template = match config {
        Some(config) => config.template(Type::String),
        None => Column::new("", Type::String),
    };

    if template.ty.is_string() {
        template = template.with_size(DEFAULT_SIZE);
    }

    Ok(vec![plan::column(template, config, DEFAULT_COLUMN, cx)?])
}

pub(super) fn class_of(
    owner: &ClassMapping,
    repo: &Repository,
    base: &Arc<ClassMapping>,
    result: &ResultRow,
) -> Result<Arc<ClassMapping>> {
    let column = column(owner)?;
    if !result.contains(column) {
        return Ok(base.clone());
    }

    let value = result.get(column)?;
    if value.is_null() {
        return Ok(base.clone());
    }

    std::iter::once(base.clone())
        .chain(repo.subclasses(base))
        .find(|cls| Discriminator::literal(cls) == value)
        .ok_or_else(|| {
            Error::invalid_value(format!(
                "no class of the `{}` hierarchy has discriminator {value:?}",
                base.name()
            ))
        })
}

/// Selecting the whole hierarchy from its root needs no filter, and neither
/// does a root without subclasses.
pub(super) fn has_class_conditions(repo: &Repository, base: &ClassMapping, subclasses: bool) -> bool {
    if base.superclass().is_some() {
        return true;
    }

    !subclasses && !repo.subclasses(base).is_empty()
}

pub(super) fn class_conditions(
    owner: &ClassMapping,
    repo: &Repository,
    base: &ClassMapping,
    subclasses: bool,
) -> Result<Option<Expr>> {
    if !has_class_conditions(repo, base, subclasses) {
        return Ok(None);
    }

    let column = column(owner)?;

    let mut values = vec![Discriminator::literal(base)];
    if subclasses {
        values.extend(
            repo.subclasses(base)
                .iter()
                .map(|cls| Discriminator::literal(cls)),
        );
    }

    Ok(Some(Expr::in_list(Expr::column(&column.name), values)))
}

/// Writes the literal of `cls` into the discriminator column of `owner`.
pub(super) fn insert(owner: &ClassMapping, cls: &ClassMapping, rows: &mut RowManager) -> Result<()> {
    if !cls.discriminator().must_carry_value() {
        return Ok(());
    }

    let column = column(owner)?;
    rows.row(owner.table()?, RowAction::Insert)
        .set(column, Discriminator::literal(cls))
}

fn column(owner: &ClassMapping) -> Result<&Column> {
    match &owner.discriminator().columns()?[..] {
        [column] => Ok(column),
        columns => Err(Error::invalid_mapping(format!(
            "value-map discriminator of `{}` needs one column, got {}",
            owner.name(),
            columns.len()
        ))),
    }
}
