//! How a field's value reaches its columns.

mod embed;

mod handler;
pub(crate) use handler::{join_values, split_values};

mod lob;
pub use lob::MaxEmbeddedLob;

use super::lrs::LrsCollectionStrategy;
use crate::mapping::{ClassMapping, FieldMapping, MapContext};

use stratum_core::{
    async_trait,
    driver::{EagerMode, ResultRow, RowAction, RowManager, Select},
    schema::db::Column,
    Result, StateManager, Store,
};

use std::{fmt, sync::Arc};

#[derive(Debug, Clone)]
pub enum FieldStrategy {
    /// Inline storage through the value's handler
    Handler,

    /// Inline byte arrays up to the dictionary's inline limit, streamed into
    /// a large object beyond it
    MaxEmbeddedBlob(MaxEmbeddedLob),

    /// Inline strings up to the dictionary's inline limit, streamed into a
    /// large object beyond it
    MaxEmbeddedClob(MaxEmbeddedLob),

    /// The null indicator of an embedded instance
    Embed,

    /// A large-result-set collection, joined rather than materialized
    Lrs(Arc<dyn LrsCollectionStrategy>),

    Custom(Arc<dyn CustomFieldStrategy>),
}

/// Whether writing a field needs the strategy's custom I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomRequired {
    /// Rows only
    No,

    /// Custom I/O only; the field stays out of the row
    Yes,

    /// Not known without the value: write the row, then run the custom I/O,
    /// which decides for itself
    Defer,
}

/// A user-provided field strategy.
#[async_trait]
pub trait CustomFieldStrategy: fmt::Debug + Send + Sync {
    fn alias(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn map(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        cx: &mut MapContext<'_>,
    ) -> Result<Vec<Column>>;

    fn is_custom(
        &self,
        field: &FieldMapping,
        sm: Option<&dyn StateManager>,
        action: RowAction,
    ) -> CustomRequired {
        let _ = (field, sm, action);
        CustomRequired::No
    }

    fn write(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
        action: RowAction,
    ) -> Result<()> {
        let _ = (cls, field, sm, rows, action);
        Ok(())
    }

    async fn custom(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
        action: RowAction,
    ) -> Result<()> {
        let _ = (cls, field, sm, store, action);
        Ok(())
    }

    fn select(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        select: &mut Select,
        eager: EagerMode,
    ) -> Result<bool> {
        let _ = (cls, field, select, eager);
        Ok(false)
    }

    async fn load(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
        result: &ResultRow,
    ) -> Result<()> {
        let _ = (cls, field, sm, store, result);
        Ok(())
    }
}

impl CustomRequired {
    pub fn writes_row(self) -> bool {
        matches!(self, CustomRequired::No | CustomRequired::Defer)
    }

    pub fn runs_custom(self) -> bool {
        matches!(self, CustomRequired::Yes | CustomRequired::Defer)
    }
}

impl FieldStrategy {
    pub fn alias(&self) -> &str {
        match self {
            FieldStrategy::Handler => "handler",
            FieldStrategy::MaxEmbeddedBlob(_) => "max-embedded-blob",
            FieldStrategy::MaxEmbeddedClob(_) => "max-embedded-clob",
            FieldStrategy::Embed => "embed",
            FieldStrategy::Lrs(strategy) => strategy.alias(),
            FieldStrategy::Custom(strategy) => strategy.alias(),
        }
    }

    /// Plans the field's columns.
    pub fn map(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        cx: &mut MapContext<'_>,
    ) -> Result<Vec<Column>> {
        match self {
            FieldStrategy::Handler => handler::map(field, cx),
            FieldStrategy::MaxEmbeddedBlob(lob) => lob.map(lob::LobKind::Blob, field, cx),
            FieldStrategy::MaxEmbeddedClob(lob) => lob.map(lob::LobKind::Clob, field, cx),
            FieldStrategy::Embed => embed::map(field, cx),
            FieldStrategy::Lrs(_) => Ok(vec![]),
            FieldStrategy::Custom(strategy) => strategy.map(cls, field, cx),
        }
    }

    /// Whether writing the field for `action` needs custom I/O. `sm` is
    /// `None` when the instance's state is not at hand.
    pub fn is_custom(
        &self,
        field: &FieldMapping,
        sm: Option<&dyn StateManager>,
        action: RowAction,
    ) -> CustomRequired {
        match self {
            FieldStrategy::MaxEmbeddedBlob(lob) | FieldStrategy::MaxEmbeddedClob(lob)
                if action != RowAction::Delete =>
            {
                lob.is_custom(field, sm)
            }
            FieldStrategy::Custom(strategy) => strategy.is_custom(field, sm, action),
            _ => CustomRequired::No,
        }
    }

    pub fn insert(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
    ) -> Result<()> {
        self.write(cls, field, sm, rows, RowAction::Insert)
    }

    pub fn update(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
    ) -> Result<()> {
        self.write(cls, field, sm, rows, RowAction::Update)
    }

    pub fn delete(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
    ) -> Result<()> {
        self.write(cls, field, sm, rows, RowAction::Delete)
    }

    fn write(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
        action: RowAction,
    ) -> Result<()> {
        match (self, action) {
            (FieldStrategy::Custom(strategy), action) => {
                strategy.write(cls, field, sm, rows, action)
            }
            // Deleting the owning row removes the field's columns
            (_, RowAction::Delete) => Ok(()),
            (FieldStrategy::Handler, action) => handler::write(cls, field, sm, rows, action),
            (FieldStrategy::MaxEmbeddedBlob(lob) | FieldStrategy::MaxEmbeddedClob(lob), action) => {
                lob.write(cls, field, sm, rows, action)
            }
            (FieldStrategy::Embed, action) => embed::write(cls, field, sm, rows, action),
            (FieldStrategy::Lrs(_), _) => Ok(()),
        }
    }

    pub async fn custom_insert(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
    ) -> Result<()> {
        self.custom(cls, field, sm, store, RowAction::Insert).await
    }

    pub async fn custom_update(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
    ) -> Result<()> {
        self.custom(cls, field, sm, store, RowAction::Update).await
    }

    pub async fn custom_delete(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
    ) -> Result<()> {
        self.custom(cls, field, sm, store, RowAction::Delete).await
    }

    pub(crate) async fn custom(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
        action: RowAction,
    ) -> Result<()> {
        match self {
            FieldStrategy::MaxEmbeddedBlob(lob) | FieldStrategy::MaxEmbeddedClob(lob)
                if action != RowAction::Delete =>
            {
                lob.stream(cls, field, sm, store, action).await
            }
            FieldStrategy::Custom(strategy) => strategy.custom(cls, field, sm, store, action).await,
            _ => Ok(()),
        }
    }

    /// Adds the field's columns to `select`. Returns `true` if anything was
    /// selected.
    pub fn select(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        select: &mut Select,
        eager: EagerMode,
    ) -> Result<bool> {
        match self {
            FieldStrategy::Lrs(strategy) => {
                if eager == EagerMode::None {
                    return Ok(false);
                }

                let elements = strategy.independent_element_mappings(false);
                for element in &elements {
                    let joins = select.joins().clone();
                    strategy.select_element(select, element, eager, joins)?;
                }
                Ok(!elements.is_empty())
            }
            FieldStrategy::Custom(strategy) => strategy.select(cls, field, select, eager),
            _ => {
                let columns = field.columns()?;
                for column in columns.iter() {
                    select.column(column);
                }
                Ok(!columns.is_empty())
            }
        }
    }

    /// Loads the field from a fetched row. Columns the row does not carry
    /// leave the field untouched.
    pub async fn load(
        &self,
        cls: &ClassMapping,
        field: &FieldMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
        result: &ResultRow,
    ) -> Result<()> {
        match self {
            FieldStrategy::Handler => handler::load(field, sm, store, result).await,
            FieldStrategy::MaxEmbeddedBlob(lob) | FieldStrategy::MaxEmbeddedClob(lob) => {
                lob.load(field, sm, result)
            }
            FieldStrategy::Embed => embed::load(field, sm, result),
            FieldStrategy::Lrs(_) => Ok(()),
            FieldStrategy::Custom(strategy) => strategy.load(cls, field, sm, store, result).await,
        }
    }
}
