//! How a class's persistent state maps onto tables.

pub mod embedded;

mod flat;

mod full;

mod object_id;

mod vertical;

use crate::mapping::{ClassLayout, ClassMapping, MapContext};

use stratum_core::{
    async_trait,
    driver::{EagerMode, Joins, ObjectId, ResultRow, RowAction, RowManager, Select},
    schema::db::Column,
    stmt::Value,
    Error, Result, StateManager, Store,
};

use std::{fmt, sync::Arc};
use tracing::warn;

#[derive(Debug, Clone)]
pub enum ClassStrategy {
    /// A root class with its own table
    Full,

    /// A subclass with its own table joined to its superclass's table
    Vertical,

    /// A subclass stored in its superclass's table
    Flat,

    /// A class stored inside the row of the instance embedding it
    Embedded,

    /// A declared class that is not persisted
    None,

    /// An embedded identity class
    ObjectId,

    Custom(Arc<dyn CustomClassStrategy>),
}

/// A user-provided class strategy.
///
/// Only [`CustomClassStrategy::map`] is required. Row production defaults
/// to nothing, and custom I/O is off unless the `is_custom_*` hooks opt in.
#[async_trait]
pub trait CustomClassStrategy: fmt::Debug + Send + Sync {
    fn alias(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn map(
        &self,
        cls: &ClassMapping,
        fields: &[Arc<[Column]>],
        cx: &mut MapContext<'_>,
    ) -> Result<ClassLayout>;

    fn is_primary_key_object_id(&self, cls: &ClassMapping, has_all: bool) -> bool {
        let _ = (cls, has_all);
        false
    }

    fn join_superclass(&self, cls: &ClassMapping, joins: Joins, to_this: bool) -> Result<Joins> {
        let _ = (cls, to_this);
        Ok(joins)
    }

    fn supports_eager_select(&self, cls: &ClassMapping, select: &Select, eager: EagerMode) -> bool {
        let _ = (cls, select, eager);
        true
    }

    fn insert(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        let _ = (cls, sm, rows);
        Ok(())
    }

    fn update(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        let _ = (cls, sm, rows);
        Ok(())
    }

    fn delete(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        let _ = (cls, sm, rows);
        Ok(())
    }

    fn is_custom(&self, cls: &ClassMapping, sm: &dyn StateManager, action: RowAction) -> bool {
        let _ = (cls, sm, action);
        false
    }

    /// Performs the I/O of `action` itself.
    async fn custom(
        &self,
        cls: &ClassMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
        action: RowAction,
    ) -> Result<()> {
        let _ = (cls, sm, store, action);
        Ok(())
    }

    /// Loads the instance's state without a select. Returns `true` when the
    /// instance was loaded.
    async fn custom_load(
        &self,
        cls: &ClassMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
    ) -> Result<bool> {
        let _ = (cls, sm, store);
        Ok(false)
    }

    /// Loads the instance's state from a fetched row. Returns `true` when the
    /// instance was loaded.
    async fn custom_load_result(
        &self,
        cls: &ClassMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
        result: &ResultRow,
    ) -> Result<bool> {
        let _ = (cls, sm, store, result);
        Ok(false)
    }

    /// Lists the identities of every instance of the class. `None` leaves
    /// the extent to the regular select.
    async fn custom_load_extent(
        &self,
        cls: &ClassMapping,
        store: &dyn Store,
        subclasses: bool,
    ) -> Result<Option<Vec<ObjectId>>> {
        let _ = (cls, store, subclasses);
        Ok(None)
    }
}

impl ClassStrategy {
    pub fn alias(&self) -> &str {
        match self {
            ClassStrategy::Full => "full",
            ClassStrategy::Vertical => "vertical",
            ClassStrategy::Flat => "flat",
            ClassStrategy::Embedded => "embed",
            ClassStrategy::None => "none",
            ClassStrategy::ObjectId => "object-id",
            ClassStrategy::Custom(strategy) => strategy.alias(),
        }
    }

    /// Resolves the physical identity of `cls`. `fields` holds the planned
    /// columns of the class's own fields, by position.
    pub fn map(
        &self,
        cls: &ClassMapping,
        fields: &[Arc<[Column]>],
        cx: &mut MapContext<'_>,
    ) -> Result<ClassLayout> {
        match self {
            ClassStrategy::Full => full::map(cls, fields, cx),
            ClassStrategy::Vertical => vertical::map(cls, cx),
            ClassStrategy::Flat => flat::map(cls, cx),
            ClassStrategy::Embedded => embedded::map(cls),
            ClassStrategy::None => Ok(ClassLayout {
                identity: cls.identity(),
                oid_ty: cls.oid_ty().cloned(),
                table: None,
                primary_key: Vec::new().into(),
                io: Arc::new(cls.io().clone()),
            }),
            ClassStrategy::ObjectId => object_id::map(cls),
            ClassStrategy::Custom(strategy) => strategy.map(cls, fields, cx),
        }
    }

    /// Whether the primary key columns can be derived from the object id
    /// alone. `has_all` tells whether every primary key column is known.
    pub fn is_primary_key_object_id(&self, cls: &ClassMapping, has_all: bool) -> bool {
        match self {
            ClassStrategy::Full => true,
            ClassStrategy::Vertical | ClassStrategy::Flat => match cls.superclass() {
                Some(superclass) => superclass
                    .strategy()
                    .is_primary_key_object_id(superclass, has_all),
                None => false,
            },
            ClassStrategy::Embedded | ClassStrategy::None | ClassStrategy::ObjectId => false,
            ClassStrategy::Custom(strategy) => strategy.is_primary_key_object_id(cls, has_all),
        }
    }

    /// Adds the joins from the class's table up to its superclasses' tables.
    /// With `to_this` the joins run from the superclass toward this class.
    pub fn join_superclass(&self, cls: &ClassMapping, joins: Joins, to_this: bool) -> Result<Joins> {
        match self {
            ClassStrategy::Vertical => vertical::join_superclass(cls, joins, to_this),
            ClassStrategy::Flat => match cls.superclass() {
                Some(superclass) => superclass
                    .strategy()
                    .join_superclass(superclass, joins, to_this),
                None => Ok(joins),
            },
            ClassStrategy::Custom(strategy) => strategy.join_superclass(cls, joins, to_this),
            _ => Ok(joins),
        }
    }

    /// Whether instances may be selected eagerly along with a related select.
    pub fn supports_eager_select(&self, cls: &ClassMapping, select: &Select, eager: EagerMode) -> bool {
        match self {
            ClassStrategy::Full | ClassStrategy::Flat => true,
            ClassStrategy::Vertical => eager != EagerMode::Parallel || !select.is_for_update(),
            ClassStrategy::Embedded | ClassStrategy::None | ClassStrategy::ObjectId => false,
            ClassStrategy::Custom(strategy) => strategy.supports_eager_select(cls, select, eager),
        }
    }

    pub fn insert(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        self.write(cls, sm, rows, RowAction::Insert)
    }

    pub fn update(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        self.write(cls, sm, rows, RowAction::Update)
    }

    pub fn delete(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        self.write(cls, sm, rows, RowAction::Delete)
    }

    fn write(
        &self,
        cls: &ClassMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
        action: RowAction,
    ) -> Result<()> {
        match self {
            ClassStrategy::Full => write_primary_key(cls, sm, rows, action),
            ClassStrategy::Vertical => {
                if let Some(superclass) = cls.superclass() {
                    superclass.strategy().write(superclass, sm, rows, action)?;
                }
                write_primary_key(cls, sm, rows, action)
            }
            ClassStrategy::Flat => match cls.superclass() {
                Some(superclass) => superclass.strategy().write(superclass, sm, rows, action),
                None => Ok(()),
            },
            ClassStrategy::Embedded | ClassStrategy::ObjectId => Ok(()),
            ClassStrategy::None => {
                let instance = sm.managed_instance();
                let identity = sm.object_id().map(ToString::to_string);

                warn!(
                    class = cls.name(),
                    instance = %instance,
                    action = ?action,
                    "attempt to flush an unmapped instance"
                );

                Err(Error::unmapped_instance(instance, identity))
            }
            ClassStrategy::Custom(strategy) => match action {
                RowAction::Insert => strategy.insert(cls, sm, rows),
                RowAction::Update => strategy.update(cls, sm, rows),
                RowAction::Delete => strategy.delete(cls, sm, rows),
            },
        }
    }

    /// Whether the strategy performs the I/O of `action` itself instead of
    /// producing rows.
    pub fn is_custom(&self, cls: &ClassMapping, sm: &dyn StateManager, action: RowAction) -> bool {
        match self {
            ClassStrategy::Custom(strategy) => strategy.is_custom(cls, sm, action),
            _ => false,
        }
    }

    pub async fn custom(
        &self,
        cls: &ClassMapping,
        sm: &dyn StateManager,
        store: &dyn Store,
        action: RowAction,
    ) -> Result<()> {
        match self {
            ClassStrategy::Custom(strategy) => strategy.custom(cls, sm, store, action).await,
            _ => Ok(()),
        }
    }

    pub async fn custom_load(
        &self,
        cls: &ClassMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
    ) -> Result<bool> {
        match self {
            ClassStrategy::Custom(strategy) => strategy.custom_load(cls, sm, store).await,
            _ => Ok(false),
        }
    }

    pub async fn custom_load_result(
        &self,
        cls: &ClassMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
        result: &ResultRow,
    ) -> Result<bool> {
        match self {
            ClassStrategy::Custom(strategy) => {
                strategy.custom_load_result(cls, sm, store, result).await
            }
            _ => Ok(false),
        }
    }

    pub async fn custom_load_extent(
        &self,
        cls: &ClassMapping,
        store: &dyn Store,
        subclasses: bool,
    ) -> Result<Option<Vec<ObjectId>>> {
        match self {
            ClassStrategy::Custom(strategy) => {
                strategy.custom_load_extent(cls, store, subclasses).await
            }
            _ => Ok(None),
        }
    }

    /// Whether `value`, read from the embedding's null-indicator column,
    /// stands for an absent embedded instance.
    pub fn indicates_null(&self, cls: &ClassMapping, value: &Value) -> Result<bool> {
        match (self, cls.embedding()) {
            (ClassStrategy::Embedded, Some(embedding)) => {
                Ok(embedded::indicates_null(embedding.field().columns()?, value))
            }
            _ => Ok(value.is_null()),
        }
    }

    /// The value to write into the embedding's null-indicator column, or
    /// `None` when the embedding has no single indicator column.
    pub fn null_indicator_value(&self, cls: &ClassMapping, present: bool) -> Result<Option<Value>> {
        match (self, cls.embedding()) {
            (ClassStrategy::Embedded, Some(embedding)) => Ok(embedded::null_indicator_value(
                embedding.field().columns()?,
                present,
            )),
            _ => Ok(None),
        }
    }
}

/// Writes the instance's key into the primary key columns of its row, or
/// restricts updates and deletes to that key.
fn write_primary_key(
    cls: &ClassMapping,
    sm: &dyn StateManager,
    rows: &mut RowManager,
    action: RowAction,
) -> Result<()> {
    let layout = cls.layout()?;
    let table = cls.table()?;

    let Some(id) = sm.object_id() else {
        if action == RowAction::Insert {
            // The datastore assigns the key
            rows.row(table, action);
            return Ok(());
        }

        return Err(Error::invalid_value(format!(
            "{} has no identity",
            sm.managed_instance()
        )));
    };

    let key = id.key_values();
    if key.len() != layout.primary_key.len() {
        return Err(Error::invalid_value(format!(
            "identity `{id}` has {} key values but `{}` has {} primary key columns",
            key.len(),
            cls.name(),
            layout.primary_key.len()
        )));
    }

    let row = rows.row(table, action);
    for (i, (column, value)) in layout.primary_key.iter().zip(key).enumerate() {
        match action {
            RowAction::Insert if layout.io.is_insertable(i) => row.set(column, value.clone())?,
            RowAction::Insert => {}
            RowAction::Update | RowAction::Delete => row.where_eq(column, value.clone())?,
        }
    }

    Ok(())
}
