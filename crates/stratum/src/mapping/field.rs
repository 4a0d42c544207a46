use super::{ColumnConfig, NullValue, ValueKind, ValueMapping};
use crate::strategy::{
    codec::ValueHandler, field::FieldStrategy, registry::Selection, Registry,
};

use stratum_core::{
    schema::db::{Column, ColumnIo},
    stmt::Type,
    Result,
};

use std::sync::Arc;

/// One persistent field of a class.
#[derive(Debug)]
pub struct FieldMapping {
    index: usize,
    name: String,
    value: ValueMapping,
    primary_key: bool,
    io: ColumnIo,
    strategy: FieldStrategy,
}

#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    value: ValueMapping,
    primary_key: bool,
    io: ColumnIo,
    handler: Selection<ValueHandler>,
    strategy: Selection<FieldStrategy>,
}

impl FieldMapping {
    pub fn builder(name: impl Into<String>, ty: Type) -> FieldBuilder {
        FieldBuilder {
            name: name.into(),
            value: ValueMapping::new(ty),
            primary_key: false,
            io: ColumnIo::default(),
            handler: Selection::Default,
            strategy: Selection::Default,
        }
    }

    /// Index of the field within its class hierarchy. State managers address
    /// field values by this index.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &ValueMapping {
        &self.value
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn io(&self) -> &ColumnIo {
        &self.io
    }

    pub fn strategy(&self) -> &FieldStrategy {
        &self.strategy
    }

    pub fn columns(&self) -> Result<&Arc<[Column]>> {
        self.value.columns()
    }
}

impl FieldBuilder {
    pub fn primary_key(&mut self) -> &mut Self {
        self.primary_key = true;
        self
    }

    pub fn column(&mut self, column: ColumnConfig) -> &mut Self {
        self.value.push_column(column);
        self
    }

    pub fn null_value(&mut self, null_value: NullValue) -> &mut Self {
        self.value.set_null_value(null_value);
        self
    }

    /// Marks the field's value as the owner's object identity.
    pub fn object_id(&mut self) -> &mut Self {
        self.value.set_kind(ValueKind::ObjectId);
        self
    }

    pub fn column_io(&mut self, io: ColumnIo) -> &mut Self {
        self.io = io;
        self
    }

    pub fn handler(&mut self, handler: ValueHandler) -> &mut Self {
        self.handler = Selection::Strategy(handler);
        self
    }

    pub fn handler_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.handler = Selection::Alias(alias.into());
        self
    }

    pub fn strategy(&mut self, strategy: FieldStrategy) -> &mut Self {
        self.strategy = Selection::Strategy(strategy);
        self
    }

    pub fn strategy_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.strategy = Selection::Alias(alias.into());
        self
    }

    pub(crate) fn build(&self, index: usize, registry: &Registry) -> Result<FieldMapping> {
        let ty = self.value.ty();

        let strategy = match &self.strategy {
            Selection::Strategy(strategy) => strategy.clone(),
            Selection::Alias(alias) => registry.field_strategy(alias)?,
            Selection::Default => match ty {
                Type::Model(_) => FieldStrategy::Embed,
                _ => FieldStrategy::Handler,
            },
        };

        let handler = match &self.handler {
            Selection::Strategy(handler) => Some(handler.clone()),
            Selection::Alias(alias) => Some(registry.value_handler(alias)?),
            Selection::Default => match &strategy {
                FieldStrategy::MaxEmbeddedBlob(_) => Some(ValueHandler::Bytes),
                FieldStrategy::MaxEmbeddedClob(_) => Some(ValueHandler::Clob),
                FieldStrategy::Handler => ValueHandler::default_for(ty),
                _ => None,
            },
        };

        let mut value = self.value.clone();
        if let Some(handler) = handler {
            value.set_handler(handler);
        }

        Ok(FieldMapping {
            index,
            name: self.name.clone(),
            value,
            primary_key: self.primary_key,
            io: self.io.clone(),
            strategy,
        })
    }
}
