//! Optimistic version tokens.
//!
//! A strategy compares tokens and produces the next one; the flush engine
//! does detect-then-advance with them the same way for every token shape.

mod multi;
pub use multi::MultiColumnVersion;

mod number;
pub use number::NumberVersion;

mod timestamp;

use super::field::{join_values, split_values};
use crate::mapping::{ClassMapping, MapContext};

use stratum_core::{
    async_trait,
    driver::{ResultRow, Row, RowAction, RowManager, Select},
    schema::db::Column,
    stmt::{Expr, Value},
    Error, Result, StateManager, Store,
};

use indexmap::IndexMap;
use std::{cmp::Ordering, fmt, sync::Arc};
use tracing::debug;

#[derive(Debug, Clone)]
pub enum VersionStrategy {
    /// No version; updates are never checked
    None,

    /// A single integer incremented on every update
    Number(NumberVersion),

    /// The wall-clock time of the last update
    Timestamp,

    /// A vector of integers, each incremented independently
    MultiColumnNumber(MultiColumnVersion),

    /// Whatever the superclass's version strategy does
    Superclass(SuperclassVersion),

    Custom(Arc<dyn CustomVersionStrategy>),
}

/// Forwards to the version of a superclass. Holds no state of its own.
#[derive(Clone)]
pub struct SuperclassVersion {
    superclass: Arc<ClassMapping>,
}

/// A user-provided version strategy.
#[async_trait]
pub trait CustomVersionStrategy: fmt::Debug + Send + Sync {
    fn alias(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn map(&self, cls: &ClassMapping, cx: &mut MapContext<'_>) -> Result<Vec<Column>>;

    fn compare_version(&self, a: &Value, b: &Value) -> Ordering {
        compare_values(a, b)
    }

    fn next_version(&self, cls: &ClassMapping, current: &Value) -> Result<Value>;

    /// Validates the instance's version against the store, advancing it
    /// when `update` is set. Returns `true` if the version is current.
    async fn check_version(
        &self,
        cls: &ClassMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
        update: bool,
    ) -> Result<bool> {
        check_columns(
            cls,
            sm,
            store,
            update,
            |a, b| self.compare_version(a, b),
            |current| self.next_version(cls, current),
        )
        .await
    }

    fn after_load(&self, cls: &ClassMapping, sm: &mut dyn StateManager) -> Result<()> {
        let _ = (cls, sm);
        Ok(())
    }

    fn bulk_update_values(&self, cls: &ClassMapping) -> Result<IndexMap<String, Expr>> {
        let _ = cls;
        Ok(IndexMap::new())
    }
}

impl VersionStrategy {
    /// A strategy delegating to the version of `superclass`.
    pub fn superclass(superclass: &Arc<ClassMapping>) -> VersionStrategy {
        VersionStrategy::Superclass(SuperclassVersion {
            superclass: superclass.clone(),
        })
    }

    pub fn alias(&self) -> &str {
        match self {
            VersionStrategy::None => "none",
            VersionStrategy::Number(_) => "version-number",
            VersionStrategy::Timestamp => "version-timestamp",
            VersionStrategy::MultiColumnNumber(_) => "version-numbers",
            VersionStrategy::Superclass(_) => "superclass",
            VersionStrategy::Custom(strategy) => strategy.alias(),
        }
    }

    /// The strategy doing the actual work for `cls`, and the class whose
    /// version it is.
    pub fn resolve<'a>(&'a self, cls: &'a ClassMapping) -> (&'a VersionStrategy, &'a ClassMapping) {
        match self {
            VersionStrategy::Superclass(delegate) => {
                let superclass = &*delegate.superclass;
                superclass.version().strategy().resolve(superclass)
            }
            strategy => (strategy, cls),
        }
    }

    /// Plans the version columns of `cls`.
    pub fn map(&self, cls: &ClassMapping, cx: &mut MapContext<'_>) -> Result<Vec<Column>> {
        let configs = cls.version().column_configs();

        match self {
            VersionStrategy::None | VersionStrategy::Superclass(_) => {
                if configs.is_empty() {
                    Ok(vec![])
                } else {
                    Err(Error::invalid_mapping(format!(
                        "version columns configured but strategy `{}` declares none",
                        self.alias()
                    )))
                }
            }
            VersionStrategy::Number(_) => number::map(configs, cx),
            VersionStrategy::Timestamp => timestamp::map(configs, cx),
            VersionStrategy::MultiColumnNumber(multi) => multi.map(configs, cx),
            VersionStrategy::Custom(strategy) => strategy.map(cls, cx),
        }
    }

    /// The columns holding the version of `cls`, wherever they are declared.
    pub fn columns<'a>(&'a self, cls: &'a ClassMapping) -> Result<&'a Arc<[Column]>> {
        let (_, owner) = self.resolve(cls);
        owner.version().columns()
    }

    /// Adds the version columns to `select`. Returns `true` if anything was
    /// selected.
    pub fn select(&self, cls: &ClassMapping, select: &mut Select) -> Result<bool> {
        let columns = self.columns(cls)?;
        for column in columns.iter() {
            select.column(column);
        }
        Ok(!columns.is_empty())
    }

    /// Reads the version from a fetched row, when the row carries it.
    pub fn load(&self, cls: &ClassMapping, sm: &mut dyn StateManager, result: &ResultRow) -> Result<()> {
        let (_, owner) = self.resolve(cls);
        let columns = owner.version().columns()?;

        if columns.is_empty() || !columns.iter().all(|column| result.contains(column)) {
            return Ok(());
        }

        let version = join_values(columns, result)?;
        if let Some(field) = owner.version().field() {
            sm.store(field, version.clone());
        }
        sm.set_version(version);

        Ok(())
    }

    /// Runs once the instance is fully loaded.
    pub fn after_load(&self, cls: &ClassMapping, sm: &mut dyn StateManager) -> Result<()> {
        match self.resolve(cls) {
            (VersionStrategy::Custom(strategy), owner) => strategy.after_load(owner, sm),
            _ => Ok(()),
        }
    }

    /// Writes the initial version of a new instance.
    pub fn insert(&self, cls: &ClassMapping, sm: &mut dyn StateManager, rows: &mut RowManager) -> Result<()> {
        let (strategy, owner) = self.resolve(cls);
        let columns = owner.version().columns()?;
        if columns.is_empty() {
            return Ok(());
        }

        let next = strategy.next_version(owner, &Value::Null)?;
        set_version(rows.row(owner.table()?, RowAction::Insert), columns, &next)?;
        sm.set_next_version(next);

        Ok(())
    }

    /// Restricts the update to the loaded version and writes the next one.
    pub fn update(&self, cls: &ClassMapping, sm: &mut dyn StateManager, rows: &mut RowManager) -> Result<()> {
        let (strategy, owner) = self.resolve(cls);
        let columns = owner.version().columns()?;
        if columns.is_empty() {
            return Ok(());
        }

        let current = sm.version();
        let next = strategy.next_version(owner, &current)?;

        let row = rows.row(owner.table()?, RowAction::Update);
        where_version(row, columns, &current)?;
        set_version(row, columns, &next)?;
        sm.set_next_version(next);

        Ok(())
    }

    /// Restricts the delete to the loaded version.
    pub fn delete(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        let (_, owner) = self.resolve(cls);
        let columns = owner.version().columns()?;
        if columns.is_empty() {
            return Ok(());
        }

        where_version(rows.row(owner.table()?, RowAction::Delete), columns, &sm.version())
    }

    /// Validates the instance's version against the stored one, advancing
    /// it when `update` is set. Returns `true` if the version is current.
    ///
    /// Without a version there is nothing to validate: the check passes only
    /// when no update is requested.
    pub async fn check_version(
        &self,
        cls: &ClassMapping,
        sm: &mut dyn StateManager,
        store: &dyn Store,
        update: bool,
    ) -> Result<bool> {
        match self.resolve(cls) {
            (VersionStrategy::None, _) => Ok(!update),
            (VersionStrategy::Custom(strategy), owner) => {
                strategy.check_version(owner, sm, store, update).await
            }
            (strategy, owner) => {
                check_columns(
                    owner,
                    sm,
                    store,
                    update,
                    compare_values,
                    |current| strategy.next_version(owner, current),
                )
                .await
            }
        }
    }

    pub fn compare_version(&self, cls: &ClassMapping, a: &Value, b: &Value) -> Ordering {
        match self.resolve(cls) {
            (VersionStrategy::None, _) => Ordering::Equal,
            (VersionStrategy::Custom(strategy), _) => strategy.compare_version(a, b),
            _ => compare_values(a, b),
        }
    }

    /// The version following `current`; `Null` stands for a new instance.
    pub fn next_version(&self, cls: &ClassMapping, current: &Value) -> Result<Value> {
        match self.resolve(cls) {
            (VersionStrategy::None, _) => Ok(Value::Null),
            (VersionStrategy::Number(number), owner) => {
                number.next(owner.version().columns()?, current)
            }
            (VersionStrategy::Timestamp, _) => Ok(timestamp::now()),
            (VersionStrategy::MultiColumnNumber(multi), _) => multi.next(current),
            (VersionStrategy::Custom(strategy), owner) => strategy.next_version(owner, current),
            (VersionStrategy::Superclass(_), _) => unreachable!("resolved delegate"),
        }
    }

    /// Column assignments advancing the version of every row a bulk update
    /// touches, computed by the database.
    pub fn bulk_update_values(&self, cls: &ClassMapping) -> Result<IndexMap<String, Expr>> {
        match self.resolve(cls) {
            (VersionStrategy::Number(_) | VersionStrategy::MultiColumnNumber(_), owner) => {
                Ok(number::bulk_update_values(owner.version().columns()?))
            }
            (VersionStrategy::Timestamp, owner) => {
                Ok(timestamp::bulk_update_values(owner.version().columns()?))
            }
            (VersionStrategy::Custom(strategy), owner) => strategy.bulk_update_values(owner),
            _ => Ok(IndexMap::new()),
        }
    }
}

impl fmt::Debug for SuperclassVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperclassVersion")
            .field("superclass", &self.superclass.name())
            .finish()
    }
}

/// Orders two version tokens. `Null`, the version of an unsaved instance,
/// is earlier than anything. Integers of any width compare by value, floats
/// by their total order, records and lists element by element.
///
/// Tokens of unrelated kinds are ordered by kind so that swapping the
/// arguments always reverses the result.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Char(a), Value::Char(b)) => a.cmp(b),
        (Value::String(a), Value::String(b)) | (Value::Locale(a), Value::Locale(b)) => {
            a.cmp(b)
        }
        (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
        (Value::Chars(a), Value::Chars(b)) => a.cmp(b),
        (Value::Timestamp(a), Value::Timestamp(b)) => a.cmp(b),
        (Value::Date(a), Value::Date(b)) => a.cmp(b),
        (Value::Enum(a), Value::Enum(b)) => (&a.ty, a.ordinal).cmp(&(&b.ty, b.ordinal)),
        (Value::Record(a), Value::Record(b)) | (Value::List(a), Value::List(b)) => a
            .iter()
            .zip(b)
            .map(|(a, b)| compare_values(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (a, b) => match (a.as_i128(), b.as_i128(), as_f64(a), as_f64(b)) {
            (Some(a), Some(b), ..) => a.cmp(&b),
            (.., Some(a), Some(b)) => a.total_cmp(&b),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match *value {
        Value::F32(v) => Some(v.into()),
        Value::F64(v) => Some(v),
        _ => None,
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::I8(_)
        | Value::I16(_)
        | Value::I32(_)
        | Value::I64(_)
        | Value::U8(_)
        | Value::BigInt(_) => 2,
        Value::F32(_) | Value::F64(_) => 3,
        Value::Char(_) => 4,
        Value::String(_) => 5,
        Value::Chars(_) => 6,
        Value::Bytes(_) => 7,
        Value::Locale(_) => 8,
        Value::Timestamp(_) => 9,
        Value::Date(_) => 10,
        Value::Enum(_) => 11,
        Value::List(_) => 12,
        Value::Record(_) => 13,
    }
}

/// Compares the instance's version with the one in its row and advances it
/// when `update` is set. Shared by every column-backed strategy.
async fn check_columns<C, N>(
    cls: &ClassMapping,
    sm: &mut dyn StateManager,
    store: &dyn Store,
    update: bool,
    compare: C,
    next: N,
) -> Result<bool>
where
    C: FnOnce(&Value, &Value) -> Ordering,
    N: FnOnce(&Value) -> Result<Value>,
{
    let columns = cls.version().columns()?;
    if columns.is_empty() {
        return Ok(!update);
    }

    let Some(stored) = stored_version(cls, columns, &*sm, store, update).await? else {
        return Ok(false);
    };

    let current = sm.version();
    if compare(&current, &stored).is_ne() {
        debug!(
            class = cls.name(),
            current = ?current,
            stored = ?stored,
            "stale version"
        );
        return Ok(false);
    }

    if update {
        sm.set_next_version(next(&current)?);
    }

    Ok(true)
}

/// Reads the version currently stored for the instance, locking the row
/// when `update` is set. `None` when the instance has no row.
async fn stored_version(
    cls: &ClassMapping,
    columns: &[Column],
    sm: &dyn StateManager,
    store: &dyn Store,
    update: bool,
) -> Result<Option<Value>> {
    let Some(id) = sm.object_id() else {
        return Ok(None);
    };

    let mut select = Select::new();
    for column in columns {
        select.column(column);
    }
    if update {
        select.for_update();
    }

    match store.select(&select, id).await? {
        Some(result) => Ok(Some(join_values(columns, &result)?)),
        None => {
            debug!(class = cls.name(), id = %id, "no row to check the version against");
            Ok(None)
        }
    }
}

fn set_version(row: &mut Row, columns: &[Column], version: &Value) -> Result<()> {
    for (column, value) in columns.iter().zip(split_values(columns, version.clone())?) {
        row.set(column, value)?;
    }
    Ok(())
}

fn where_version(row: &mut Row, columns: &[Column], version: &Value) -> Result<()> {
    if version.is_null() {
        return Ok(());
    }

    for (column, value) in columns.iter().zip(split_values(columns, version.clone())?) {
        row.where_eq(column, value)?;
    }
    Ok(())
}
