//! Converters between object values and storage values.

mod bytes;

mod chars;

mod clob;

mod enumeration;
pub use enumeration::{EnumStorage, EnumValueHandler};

mod immutable;

use crate::mapping::{MapContext, ValueMapping};

use stratum_core::{
    async_trait,
    schema::db::Column,
    stmt::{Type, Value},
    StateManager, Store, Result,
};

use std::{fmt, sync::Arc};

/// Converts the values of one value mapping.
///
/// Handlers carrying state (enum constants) must not be shared between
/// value mappings; every value mapping owns its handler.
#[derive(Debug, Clone)]
pub enum ValueHandler {
    /// Byte arrays in an unsized binary column
    Bytes,

    /// Character arrays in a string column
    Chars,

    /// Strings in an unsized character column
    Clob,

    /// Enum constants by ordinal or name
    Enum(EnumValueHandler),

    /// Scalars written as they are
    Immutable,

    Custom(Arc<dyn CustomValueHandler>),
}

/// A user-provided value handler.
#[async_trait]
pub trait CustomValueHandler: fmt::Debug + Send + Sync {
    fn alias(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Column templates for `value`. Unnamed templates are named by the
    /// column planner.
    fn plan_columns(&self, value: &ValueMapping, cx: &MapContext<'_>) -> Result<Vec<Column>>;

    fn to_storage(&self, value: &ValueMapping, object: Value) -> Result<Value>;

    fn to_object(&self, value: &ValueMapping, stored: Value) -> Result<Value>;

    /// Converts a stored value that needs store access to be materialized.
    async fn to_object_loaded(
        &self,
        value: &ValueMapping,
        stored: Value,
        sm: &dyn StateManager,
        store: &dyn Store,
    ) -> Result<Value> {
        let _ = (sm, store);
        self.to_object(value, stored)
    }

    fn is_versionable(&self, value: &ValueMapping) -> bool {
        let _ = value;
        false
    }
}

impl ValueHandler {
    /// The handler a value of type `ty` gets when none is configured.
    pub fn default_for(ty: &Type) -> Option<ValueHandler> {
        match ty {
            Type::Bytes => Some(ValueHandler::Bytes),
            Type::Chars => Some(ValueHandler::Chars),
            Type::List(item) => match **item {
                Type::U8 => Some(ValueHandler::Bytes),
                Type::Char => Some(ValueHandler::Chars),
                _ => None,
            },
            Type::Enum(_) => Some(ValueHandler::Enum(EnumValueHandler::default())),
            Type::Model(_) | Type::Object | Type::Record(_) => None,
            _ => Some(ValueHandler::Immutable),
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            ValueHandler::Bytes => "bytes",
            ValueHandler::Chars => "chars",
            ValueHandler::Clob => "clob",
            ValueHandler::Enum(_) => "enum",
            ValueHandler::Immutable => "immutable",
            ValueHandler::Custom(handler) => handler.alias(),
        }
    }

    /// Column templates for `value`. Fails when the handler cannot represent
    /// the declared type.
    pub fn plan_columns(&self, value: &ValueMapping, cx: &MapContext<'_>) -> Result<Vec<Column>> {
        match self {
            ValueHandler::Bytes => bytes::plan_columns(value),
            ValueHandler::Chars => chars::plan_columns(value),
            ValueHandler::Clob => clob::plan_columns(value),
            ValueHandler::Enum(handler) => handler.plan_columns(value, cx),
            ValueHandler::Immutable => immutable::plan_columns(value),
            ValueHandler::Custom(handler) => handler.plan_columns(value, cx),
        }
    }

    pub fn to_storage(&self, value: &ValueMapping, object: Value) -> Result<Value> {
        match self {
            ValueHandler::Bytes => bytes::to_storage(object),
            ValueHandler::Chars => chars::to_storage(object),
            ValueHandler::Clob => clob::convert(object),
            ValueHandler::Enum(handler) => handler.to_storage(object),
            ValueHandler::Immutable => immutable::to_storage(value, object),
            ValueHandler::Custom(handler) => handler.to_storage(value, object),
        }
    }

    pub fn to_object(&self, value: &ValueMapping, stored: Value) -> Result<Value> {
        match self {
            ValueHandler::Bytes => bytes::to_object(value, stored),
            ValueHandler::Chars => chars::to_object(value, stored),
            ValueHandler::Clob => clob::convert(stored),
            ValueHandler::Enum(handler) => handler.to_object(stored),
            ValueHandler::Immutable => Ok(stored),
            ValueHandler::Custom(handler) => handler.to_object(value, stored),
        }
    }

    /// Like [`ValueHandler::to_object`], giving custom handlers access to the
    /// store.
    pub async fn to_object_loaded(
        &self,
        value: &ValueMapping,
        stored: Value,
        sm: &dyn StateManager,
        store: &dyn Store,
    ) -> Result<Value> {
        match self {
            ValueHandler::Custom(handler) => {
                handler.to_object_loaded(value, stored, sm, store).await
            }
            _ => self.to_object(value, stored),
        }
    }

    /// Whether values may take part in optimistic version comparison.
    pub fn is_versionable(&self, value: &ValueMapping) -> bool {
        match self {
            ValueHandler::Enum(_) => true,
            ValueHandler::Immutable => value.ty().is_scalar(),
            ValueHandler::Custom(handler) => handler.is_versionable(value),
            ValueHandler::Bytes | ValueHandler::Chars | ValueHandler::Clob => false,
        }
    }
}

/// Returns `true` for `List(item)` where the item type is `item`.
fn is_list_of(ty: &Type, item: &Type) -> bool {
    matches!(ty, Type::List(ty) if **ty == *item)
}
