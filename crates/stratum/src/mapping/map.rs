use super::ClassMapping;
use crate::strategy::codec::EnumStorage;

use stratum_core::{
    err,
    schema::db::{self, Column, Table},
    stmt::TypeEnum,
    Dictionary, Error, Result,
};

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// State shared by strategies while classes are mapped.
pub struct MapContext<'a> {
    pub(crate) schema: &'a mut db::Schema,
    pub(crate) dictionary: &'a Dictionary,
    pub(crate) adapt: bool,
    pub(crate) table_name_prefix: &'a str,
    pub(crate) enums: &'a IndexMap<Arc<str>, Arc<TypeEnum>>,
    pub(crate) enum_storage: EnumStorage,
}

impl MapContext<'_> {
    pub fn dictionary(&self) -> &Dictionary {
        self.dictionary
    }

    /// Whether mapping may add missing tables to the schema.
    pub fn adapt_schema(&self) -> bool {
        self.adapt
    }

    /// The enum storage mode used when a handler does not pick one.
    pub fn enum_storage(&self) -> EnumStorage {
        self.enum_storage
    }

    /// The registered constants of enum type `name`.
    pub fn enum_type(&self, name: &str) -> Result<Arc<TypeEnum>> {
        self.enums.get(name).cloned().ok_or_else(|| {
            Error::invalid_mapping(format!(
                "enum type `{name}` has no registered constants"
            ))
        })
    }

    pub fn resolve_table(&mut self, name: &str) -> Result<Arc<Table>> {
        self.schema.resolve_table(name, self.adapt)
    }

    /// The table name used when a class does not configure one.
    pub fn default_table_name(&self, cls: &ClassMapping) -> String {
        format!("{}{}", self.table_name_prefix, cls.name())
    }
}

struct MappedClass {
    fields: Vec<Arc<[Column]>>,
    layout: super::ClassLayout,
    version: Arc<[Column]>,
    discriminator: super::discriminator::MappedDiscriminator,
}

/// Maps `cls` after its superclass and owners. The class's columns and
/// layout are committed only once every part maps. Strategy caches and tables
/// added in adapt mode are kept from a failed pass.
pub(crate) fn map_class(cx: &mut MapContext<'_>, cls: &ClassMapping) -> Result<()> {
    if cls.is_mapped() {
        return Ok(());
    }

    if let Some(superclass) = cls.superclass() {
        map_class(cx, superclass)?;
    }

    if let Some(embedding) = cls.embedding() {
        map_class(cx, embedding.owner())?;

        if let Some(mapped_by) = embedding.mapped_by() {
            map_class(cx, mapped_by)?;
        }
    }

    let mapped = map_parts(cx, cls)
        .map_err(|e| e.context(err!("failed to map class `{}`", cls.name())))?;

    for (field, columns) in cls.fields().iter().zip(mapped.fields) {
        debug!(
            class = cls.name(),
            field = field.name(),
            strategy = field.strategy().alias(),
            columns = columns.len(),
            "mapped field"
        );
        field.value().commit_columns(columns);
    }

    debug!(
        class = cls.name(),
        strategy = cls.version().strategy().alias(),
        columns = mapped.version.len(),
        "mapped version"
    );
    cls.version().commit(mapped.version);
    cls.discriminator().commit(mapped.discriminator);

    debug!(
        class = cls.name(),
        strategy = cls.strategy().alias(),
        table = mapped.layout.table.as_ref().map(|table| table.name.as_str()),
        "mapped class"
    );
    cls.commit_layout(mapped.layout);

    Ok(())
}

fn map_parts(cx: &mut MapContext<'_>, cls: &ClassMapping) -> Result<MappedClass> {
    let fields = cls
        .fields()
        .iter()
        .map(|field| {
            field
                .strategy()
                .map(cls, field, cx)
                .map(Arc::from)
                .map_err(|e| e.context(err!("field `{}`", field.name())))
        })
        .collect::<Result<Vec<_>>>()?;

    let layout = cls.strategy().map(cls, &fields, cx)?;
    let version = cls.version().strategy().map(cls, cx)?;
    let discriminator = cls.discriminator().map(cls, cx)?;

    Ok(MappedClass {
        fields,
        layout,
        version: version.into(),
        discriminator,
    })
}
