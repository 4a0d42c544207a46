use super::{handler, CustomRequired};
use crate::mapping::{ClassMapping, FieldMapping, MapContext};

use stratum_core::{
    driver::{LobTarget, ResultRow, RowAction, RowManager},
    schema::db::Column,
    stmt::{Type, Value},
    Error, Result, StateManager, Store,
};

use std::sync::OnceLock;
use tracing::trace;

/// Writes values inline while they fit the dictionary's inline limit and
/// streams larger ones into a large object.
///
/// A `NOT NULL` column has no way to defer its value, so it always stays
/// inline regardless of size.
#[derive(Debug, Clone, Default)]
pub struct MaxEmbeddedLob {
    /// The inline limit, captured when the field is mapped. `None` inside
    /// means the dictionary has no limit.
    max: OnceLock<Option<u64>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LobKind {
    Blob,
    Clob,
}

impl MaxEmbeddedLob {
    /// The inline limit, once mapped.
    pub fn max_size(&self) -> Option<u64> {
        self.max.get().copied().flatten()
    }

    /// Returns `true` if `value` is longer than the inline limit. Byte
    /// arrays count bytes, strings count characters.
    pub fn is_oversized(&self, value: &Value) -> bool {
        match (self.max_size(), length(value)) {
            (Some(max), Some(len)) => len > max,
            _ => false,
        }
    }

    pub(super) fn map(
        &self,
        kind: LobKind,
        field: &FieldMapping,
        cx: &mut MapContext<'_>,
    ) -> Result<Vec<Column>> {
        let ty = field.value().ty();
        let expected = match kind {
            LobKind::Blob => matches!(ty, Type::Bytes) || *ty == Type::list(Type::U8),
            LobKind::Clob => ty.is_string(),
        };

        if !expected {
            return Err(Error::invalid_mapping(format!(
                "{kind:?} strategy cannot map a value of type {ty:?}"
            )));
        }

        let columns = handler::map(field, cx)?;
        if columns.len() != 1 {
            return Err(Error::invalid_mapping(format!(
                "{kind:?} strategy needs exactly one column, got {}",
                columns.len()
            )));
        }

        let dictionary = cx.dictionary();
        let max = match kind {
            LobKind::Blob => dictionary.max_embedded_blob_size,
            LobKind::Clob => dictionary.max_embedded_clob_size,
        };
        self.max.get_or_init(|| max);

        Ok(columns)
    }

    pub(super) fn is_custom(
        &self,
        field: &FieldMapping,
        sm: Option<&dyn StateManager>,
    ) -> CustomRequired {
        let Some(column) = column(field) else {
            return CustomRequired::No;
        };

        if column.is_not_null() {
            return CustomRequired::No;
        }

        // The size is unknown until the value is fetched
        let Some(sm) = sm.filter(|sm| sm.is_loaded(field.index())) else {
            return CustomRequired::Defer;
        };

        if self.is_oversized(&sm.fetch(field.index())) {
            CustomRequired::Yes
        } else {
            CustomRequired::No
        }
    }

    pub(super) fn write(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
        action: RowAction,
    ) -> Result<()> {
        let writable = is_writable(field, action);

        let Some(column) = column(field) else {
            return Err(Error::invalid_mapping(format!(
                "field `{}` has not been mapped",
                field.name()
            )));
        };

        if !writable {
            return Ok(());
        }

        let object = sm.fetch(field.index());
        let row = rows.row(cls.table()?, action);

        if !column.is_not_null() && self.is_oversized(&object) {
            trace!(
                class = cls.name(),
                field = field.name(),
                "value exceeds the inline limit; writing NULL"
            );
            row.set_null(column);
            return Ok(());
        }

        let stored = to_storage(field, object)?;
        row.set(column, stored)
    }

    /// Streams an oversized value into the row's large object. Values that
    /// fit inline were written with the row and are left alone.
    pub(super) async fn stream(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
        action: RowAction,
    ) -> Result<()> {
        let Some(column) = column(field) else {
            return Ok(());
        };

        let object = sm.fetch(field.index());
        if column.is_not_null() || !is_writable(field, action) || !self.is_oversized(&object) {
            return Ok(());
        }

        let Some(id) = sm.object_id() else {
            return Err(Error::invalid_value(format!(
                "{} has no identity to stream field `{}` into",
                sm.managed_instance(),
                field.name()
            )));
        };

        trace!(
            class = cls.name(),
            field = field.name(),
            length = length(&object),
            max = self.max_size(),
            "streaming value into a large object"
        );

        let target = LobTarget {
            table: cls.table()?.clone(),
            column: column.clone(),
            id: id.clone(),
        };

        let mut lob = store.open_large_object(&target).await?;
        let dictionary = store.dictionary();

        match to_storage(field, object)? {
            Value::Bytes(bytes) => dictionary.put_bytes(&mut *lob, &bytes).await,
            Value::String(text) => dictionary.put_string(&mut *lob, &text).await,
            stored => Err(Error::type_conversion(stored, "Bytes or String")),
        }
    }

    /// Reads the inline value. An oversized value on a nullable column reads
    /// as null.
    pub(super) fn load(
        &self,
        field: &FieldMapping,
        sm: &mut dyn StateManager,
        result: &ResultRow,
    ) -> Result<()> {
        let Some(column) = column(field) else {
            return Ok(());
        };

        if !result.contains(column) {
            return Ok(());
        }

        let stored = result.get(column)?;
        let object = if !column.is_not_null() && self.is_oversized(&stored) {
            Value::Null
        } else {
            match field.value().handler() {
                Some(handler) => handler.to_object(field.value(), stored)?,
                None => stored,
            }
        };

        sm.store(field.index(), object);
        Ok(())
    }
}

fn is_writable(field: &FieldMapping, action: RowAction) -> bool {
    match action {
        RowAction::Insert => field.io().is_insertable(0),
        _ => field.io().is_updatable(0),
    }
}

fn column(field: &FieldMapping) -> Option<&Column> {
    field.columns().ok().and_then(|columns| columns.first())
}

fn to_storage(field: &FieldMapping, object: Value) -> Result<Value> {
    match field.value().handler() {
        Some(handler) => handler.to_storage(field.value(), object),
        None => Ok(object),
    }
}

fn length(value: &Value) -> Option<u64> {
    let len = match value {
        Value::Bytes(bytes) => bytes.len(),
        Value::Chars(chars) => chars.len(),
        Value::List(items) => items.len(),
        Value::String(text) => text.chars().count(),
        _ => return None,
    };
    Some(len as u64)
}
