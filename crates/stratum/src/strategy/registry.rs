use super::{
    class::{ClassStrategy, CustomClassStrategy},
    codec::{CustomValueHandler, EnumValueHandler, ValueHandler},
    discriminator::{CustomDiscriminatorStrategy, DiscriminatorStrategy},
    field::{CustomFieldStrategy, FieldStrategy, MaxEmbeddedLob},
    lrs::LrsCollectionStrategy,
    version::{CustomVersionStrategy, MultiColumnVersion, NumberVersion, VersionStrategy},
};
use crate::mapping::ClassMapping;

use stratum_core::{Error, Result};

use indexmap::IndexMap;
use std::sync::Arc;

/// How a builder picked a strategy.
#[derive(Debug, Clone)]
pub(crate) enum Selection<T> {
    /// Derived from the rest of the metadata when built
    Default,

    /// Looked up by alias when built
    Alias(String),

    Strategy(T),
}

/// Resolves strategy aliases.
///
/// Built-in aliases are always available. Custom strategies are registered
/// under their own [`alias`](CustomClassStrategy::alias) and never shadow a
/// built-in one. Every lookup returns a fresh strategy, so stateful
/// strategies are never shared between owners.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    classes: IndexMap<String, Arc<dyn CustomClassStrategy>>,
    versions: IndexMap<String, Arc<dyn CustomVersionStrategy>>,
    discriminators: IndexMap<String, Arc<dyn CustomDiscriminatorStrategy>>,
    fields: IndexMap<String, Arc<dyn CustomFieldStrategy>>,
    collections: IndexMap<String, Arc<dyn LrsCollectionStrategy>>,
    handlers: IndexMap<String, Arc<dyn CustomValueHandler>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn register_class_strategy(&mut self, strategy: Arc<dyn CustomClassStrategy>) -> &mut Self {
        self.classes.insert(strategy.alias().to_string(), strategy);
        self
    }

    pub fn register_version_strategy(
        &mut self,
        strategy: Arc<dyn CustomVersionStrategy>,
    ) -> &mut Self {
        self.versions.insert(strategy.alias().to_string(), strategy);
        self
    }

    pub fn register_discriminator_strategy(
        &mut self,
        strategy: Arc<dyn CustomDiscriminatorStrategy>,
    ) -> &mut Self {
        self.discriminators
            .insert(strategy.alias().to_string(), strategy);
        self
    }

    pub fn register_field_strategy(&mut self, strategy: Arc<dyn CustomFieldStrategy>) -> &mut Self {
        self.fields.insert(strategy.alias().to_string(), strategy);
        self
    }

    pub fn register_collection_strategy(
        &mut self,
        strategy: Arc<dyn LrsCollectionStrategy>,
    ) -> &mut Self {
        self.collections.insert(strategy.alias().to_string(), strategy);
        self
    }

    pub fn register_value_handler(&mut self, handler: Arc<dyn CustomValueHandler>) -> &mut Self {
        self.handlers.insert(handler.alias().to_string(), handler);
        self
    }

    pub fn class_strategy(&self, alias: &str) -> Result<ClassStrategy> {
        Ok(match alias {
            "full" => ClassStrategy::Full,
            "vertical" => ClassStrategy::Vertical,
            "flat" => ClassStrategy::Flat,
            "embed" => ClassStrategy::Embedded,
            "none" => ClassStrategy::None,
            "object-id" => ClassStrategy::ObjectId,
            alias => ClassStrategy::Custom(lookup(&self.classes, "class", alias)?),
        })
    }

    /// `superclass` is the persistent superclass of the class the strategy
    /// is for; the `superclass` alias needs one.
    pub fn version_strategy(
        &self,
        alias: &str,
        superclass: Option<&Arc<ClassMapping>>,
    ) -> Result<VersionStrategy> {
        Ok(match alias {
            "none" => VersionStrategy::None,
            "version-number" => VersionStrategy::Number(NumberVersion::default()),
            "version-timestamp" => VersionStrategy::Timestamp,
            "version-numbers" => VersionStrategy::MultiColumnNumber(MultiColumnVersion::default()),
            "superclass" => VersionStrategy::superclass(require_superclass("version", superclass)?),
            alias => VersionStrategy::Custom(lookup(&self.versions, "version", alias)?),
        })
    }

    pub fn discriminator_strategy(
        &self,
        alias: &str,
        superclass: Option<&Arc<ClassMapping>>,
    ) -> Result<DiscriminatorStrategy> {
        Ok(match alias {
            "none" => DiscriminatorStrategy::None,
            "value-map" => DiscriminatorStrategy::ValueMap,
            "superclass" => DiscriminatorStrategy::superclass(require_superclass(
                "discriminator",
                superclass,
            )?),
            alias => DiscriminatorStrategy::Custom(lookup(
                &self.discriminators,
                "discriminator",
                alias,
            )?),
        })
    }

    pub fn field_strategy(&self, alias: &str) -> Result<FieldStrategy> {
        Ok(match alias {
            "handler" => FieldStrategy::Handler,
            "max-embedded-blob" => FieldStrategy::MaxEmbeddedBlob(MaxEmbeddedLob::default()),
            "max-embedded-clob" => FieldStrategy::MaxEmbeddedClob(MaxEmbeddedLob::default()),
            "embed" => FieldStrategy::Embed,
            alias => match self.collections.get(alias) {
                Some(strategy) => FieldStrategy::Lrs(strategy.clone()),
                None => FieldStrategy::Custom(lookup(&self.fields, "field", alias)?),
            },
        })
    }

    pub fn value_handler(&self, alias: &str) -> Result<ValueHandler> {
        Ok(match alias {
            "bytes" => ValueHandler::Bytes,
            "chars" => ValueHandler::Chars,
            "clob" => ValueHandler::Clob,
            "enum" => ValueHandler::Enum(EnumValueHandler::default()),
            "immutable" => ValueHandler::Immutable,
            alias => ValueHandler::Custom(lookup(&self.handlers, "value handler", alias)?),
        })
    }
}

fn lookup<T: ?Sized>(
    registered: &IndexMap<String, Arc<T>>,
    family: &str,
    alias: &str,
) -> Result<Arc<T>> {
    registered
        .get(alias)
        .cloned()
        .ok_or_else(|| Error::invalid_mapping(format!("unknown {family} strategy `{alias}`")))
}

fn require_superclass<'a>(
    family: &str,
    superclass: Option<&'a Arc<ClassMapping>>,
) -> Result<&'a Arc<ClassMapping>> {
    superclass.ok_or_else(|| {
        Error::invalid_mapping(format!(
            "{family} strategy `superclass` needs a persistent superclass"
        ))
    })
}
