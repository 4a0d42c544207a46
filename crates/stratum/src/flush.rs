//! Turns one managed instance into pending row mutations.
//!
//! The class strategy runs first, so an instance that cannot be flushed at
//! all fails before anything is written. Version, discriminator and fields
//! follow. Work that bypasses rows is collected in a [`Pending`] and run
//! once the rows are executed.

use crate::mapping::{ClassMapping, FieldMapping};

use stratum_core::{
    driver::{RowAction, RowManager},
    Result, StateManager, Store,
};

use tracing::debug;

/// Custom I/O left to run after the rows of a flush are executed.
#[must_use]
#[derive(Debug)]
pub struct Pending<'a> {
    cls: &'a ClassMapping,
    action: RowAction,

    /// The class strategy performs the whole flush itself
    class: bool,

    /// Fields with custom I/O, with the class declaring each
    fields: Vec<(&'a ClassMapping, &'a FieldMapping)>,
}

/// Adds the rows inserting a new instance of `cls`.
pub fn insert<'a>(
    cls: &'a ClassMapping,
    sm: &mut dyn StateManager,
    rows: &mut RowManager,
) -> Result<Pending<'a>> {
    flush(cls, sm, rows, RowAction::Insert, None)
}

/// Adds the rows writing the `dirty` fields of an instance of `cls`, by
/// field index.
pub fn update<'a>(
    cls: &'a ClassMapping,
    sm: &mut dyn StateManager,
    rows: &mut RowManager,
    dirty: &[usize],
) -> Result<Pending<'a>> {
    flush(cls, sm, rows, RowAction::Update, Some(dirty))
}

/// Adds the rows deleting an instance of `cls`.
pub fn delete<'a>(
    cls: &'a ClassMapping,
    sm: &mut dyn StateManager,
    rows: &mut RowManager,
) -> Result<Pending<'a>> {
    flush(cls, sm, rows, RowAction::Delete, None)
}

fn flush<'a>(
    cls: &'a ClassMapping,
    sm: &mut dyn StateManager,
    rows: &mut RowManager,
    action: RowAction,
    dirty: Option<&[usize]>,
) -> Result<Pending<'a>> {
    let mut pending = Pending {
        cls,
        action,
        class: false,
        fields: vec![],
    };

    let strategy = cls.strategy();
    if strategy.is_custom(cls, &*sm, action) {
        pending.class = true;
        debug!(class = cls.name(), action = ?action, "class performs its own I/O");
        return Ok(pending);
    }

    match action {
        RowAction::Insert => strategy.insert(cls, &*sm, rows)?,
        RowAction::Update => strategy.update(cls, &*sm, rows)?,
        RowAction::Delete => strategy.delete(cls, &*sm, rows)?,
    }

    let version = cls.version().strategy();
    match action {
        RowAction::Insert => {
            version.insert(cls, sm, rows)?;
            cls.discriminator().strategy().insert(cls, &*sm, rows)?;
        }
        RowAction::Update => version.update(cls, sm, rows)?,
        RowAction::Delete => version.delete(cls, &*sm, rows)?,
    }

    for declaring in cls.hierarchy() {
        for field in declaring.fields() {
            if let Some(dirty) = dirty {
                if !dirty.contains(&field.index()) {
                    continue;
                }
            }

            let strategy = field.strategy();
            let required = strategy.is_custom(field, Some(&*sm), action);

            if required.writes_row() {
                match action {
                    RowAction::Insert => strategy.insert(declaring, field, &*sm, rows)?,
                    RowAction::Update => strategy.update(declaring, field, &*sm, rows)?,
                    RowAction::Delete => strategy.delete(declaring, field, &*sm, rows)?,
                }
            }

            if required.runs_custom() {
                pending.fields.push((declaring, field));
            }
        }
    }

    debug!(
        class = cls.name(),
        action = ?action,
        rows = rows.len(),
        custom_fields = pending.fields.len(),
        "flushed instance"
    );

    Ok(pending)
}

impl Pending<'_> {
    /// Returns `true` if nothing is left to run.
    pub fn is_empty(&self) -> bool {
        !self.class && self.fields.is_empty()
    }

    /// Whether the class strategy took over the flush.
    pub fn is_class_custom(&self) -> bool {
        self.class
    }

    /// Names of the fields with custom I/O left to run.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, field)| field.name())
    }

    /// Runs the custom I/O against `store`.
    pub async fn run(self, sm: &dyn StateManager, store: &dyn Store) -> Result<()> {
        if self.class {
            return self
                .cls
                .strategy()
                .custom(self.cls, sm, store, self.action)
                .await;
        }

        for (declaring, field) in self.fields {
            field
                .strategy()
                .custom(declaring, field, sm, store, self.action)
                .await?;
        }

        Ok(())
    }
}
