use crate::strategy::codec::ValueHandler;

use stratum_core::{
    schema::db::{self, Column},
    stmt, Error, Result,
};

use std::sync::{Arc, OnceLock};

/// The value-level view of a field, an embedded value or an identity value.
///
/// A value mapping is what a [`ValueHandler`] converts: it knows the declared
/// type, how nulls are treated and how its columns were configured.
#[derive(Debug, Clone)]
pub struct ValueMapping {
    ty: stmt::Type,
    kind: ValueKind,
    null_value: NullValue,
    columns: Vec<ColumnConfig>,
    handler: Option<ValueHandler>,

    /// Physical columns, set once the owner is mapped.
    resolved: OnceLock<Arc<[Column]>>,
}

/// What a value represents for its owner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// An ordinary persistent value
    #[default]
    Plain,

    /// The object identity of the owner, e.g. an embedded id class
    ObjectId,
}

/// How a null object value is written.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NullValue {
    /// Nulls are written as SQL `NULL`
    #[default]
    None,

    /// Nulls are written as the column type's empty value
    Default,

    /// Writing a null is an error
    Exception,
}

/// Configured overrides for one column of a value.
///
/// Anything left unset is taken from the codec's column template or derived
/// from the owning field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ColumnConfig {
    pub name: Option<String>,
    pub ty: Option<stmt::Type>,
    pub size: Option<u64>,
    pub nullable: Option<bool>,
    pub default: Option<String>,
    pub storage_ty: Option<db::Type>,
}

impl ValueMapping {
    pub fn new(ty: stmt::Type) -> ValueMapping {
        ValueMapping {
            ty,
            kind: ValueKind::Plain,
            null_value: NullValue::None,
            columns: vec![],
            handler: None,
            resolved: OnceLock::new(),
        }
    }

    pub fn ty(&self) -> &stmt::Type {
        &self.ty
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn null_value(&self) -> NullValue {
        self.null_value
    }

    pub fn column_configs(&self) -> &[ColumnConfig] {
        &self.columns
    }

    pub fn handler(&self) -> Option<&ValueHandler> {
        self.handler.as_ref()
    }

    /// The physical columns of the value.
    pub fn columns(&self) -> Result<&Arc<[Column]>> {
        self.resolved.get().ok_or_else(|| {
            Error::invalid_mapping(format!(
                "value of type {} has not been mapped",
                self.ty.name()
            ))
        })
    }

    pub fn is_mapped(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub(crate) fn set_kind(&mut self, kind: ValueKind) {
        self.kind = kind;
    }

    pub(crate) fn set_null_value(&mut self, null_value: NullValue) {
        self.null_value = null_value;
    }

    pub(crate) fn push_column(&mut self, column: ColumnConfig) {
        self.columns.push(column);
    }

    pub(crate) fn set_handler(&mut self, handler: ValueHandler) {
        self.handler = Some(handler);
    }

    pub(crate) fn commit_columns(&self, columns: Arc<[Column]>) {
        let _ = self.resolved.set(columns);
    }
}

impl ColumnConfig {
    pub fn new() -> ColumnConfig {
        ColumnConfig::default()
    }

    pub fn named(name: impl Into<String>) -> ColumnConfig {
        ColumnConfig {
            name: Some(name.into()),
            ..ColumnConfig::default()
        }
    }

    pub fn ty(mut self, ty: stmt::Type) -> ColumnConfig {
        self.ty = Some(ty);
        self
    }

    pub fn size(mut self, size: u64) -> ColumnConfig {
        self.size = Some(size);
        self
    }

    pub fn not_null(mut self) -> ColumnConfig {
        self.nullable = Some(false);
        self
    }

    pub fn nullable(mut self) -> ColumnConfig {
        self.nullable = Some(true);
        self
    }

    pub fn default_literal(mut self, default: impl Into<String>) -> ColumnConfig {
        self.default = Some(default.into());
        self
    }

    pub fn storage_ty(mut self, storage_ty: db::Type) -> ColumnConfig {
        self.storage_ty = Some(storage_ty);
        self
    }

    /// A column template from this configuration, typed `ty` unless the
    /// configuration declares its own type.
    pub fn template(&self, ty: stmt::Type) -> Column {
        let ty = self.ty.clone().unwrap_or(ty);
        Column::new(self.name.clone().unwrap_or_default(), ty)
    }
}
