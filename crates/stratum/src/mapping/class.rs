use super::{ColumnConfig, Discriminator, FieldBuilder, FieldMapping, ValueKind, Version};
use crate::strategy::{
    class::ClassStrategy, discriminator::DiscriminatorStrategy, registry::Selection,
    version::VersionStrategy, Registry,
};

use stratum_core::{
    schema::db::{Column, ColumnIo, Table},
    stmt, Error, Result,
};

use std::sync::{Arc, OnceLock};

/// One persistent class.
///
/// Classes form a tree through parent pointers: a class references its
/// persistent superclass and, when embedded, the class owning the embedding
/// field. Nothing points downward.
#[derive(Debug)]
pub struct ClassMapping {
    name: Arc<str>,
    identity: Identity,
    oid_ty: Option<ObjectIdType>,
    table: Option<String>,
    primary_key: Vec<ColumnConfig>,
    io: ColumnIo,
    superclass: Option<Arc<ClassMapping>>,
    embedding: Option<Embedding>,
    strategy: ClassStrategy,
    version: Version,
    discriminator: Discriminator,
    fields: Vec<FieldMapping>,

    /// Resolved by the class strategy when the class is mapped.
    layout: OnceLock<ClassLayout>,
}

/// How instances of a class are identified.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// Identity is made of primary key fields
    Application,

    /// Identity is a surrogate key assigned by the datastore
    Datastore,

    /// Not declared; resolved when the class is mapped
    #[default]
    Unknown,
}

/// The object-id class of a class using application identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdType {
    pub name: Arc<str>,

    /// Whether the id class is shared with other classes of the hierarchy.
    pub shared: bool,
}

/// The physical identity of a mapped class.
///
/// Classes sharing a layout share the same `Arc`s: a flat subclass holds the
/// very table, primary key and column-I/O objects of its superclass.
#[derive(Debug, Clone)]
pub struct ClassLayout {
    pub identity: Identity,
    pub oid_ty: Option<ObjectIdType>,
    pub table: Option<Arc<Table>>,
    pub primary_key: Arc<[Column]>,
    pub io: Arc<ColumnIo>,
}

/// Places an embedded class inside a field of its owner.
#[derive(Debug)]
pub struct Embedding {
    owner: Arc<ClassMapping>,
    field: usize,
    mapped_by: Option<Arc<ClassMapping>>,
}

#[derive(Debug, Clone)]
pub struct ClassBuilder {
    name: Arc<str>,
    identity: Identity,
    oid_ty: Option<ObjectIdType>,
    table: Option<String>,
    primary_key: Vec<ColumnConfig>,
    io: ColumnIo,
    superclass: Option<Arc<ClassMapping>>,
    embedding: Option<(Arc<ClassMapping>, usize)>,
    mapped_by: Option<Arc<ClassMapping>>,
    strategy: Selection<ClassStrategy>,
    version: Selection<VersionStrategy>,
    version_columns: Vec<ColumnConfig>,
    version_field: Option<usize>,
    discriminator: Selection<DiscriminatorStrategy>,
    discriminator_value: Option<stmt::Value>,
    discriminator_column: Option<ColumnConfig>,
    fields: Vec<FieldBuilder>,
}

impl ClassMapping {
    pub fn builder(name: impl Into<Arc<str>>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            identity: Identity::Unknown,
            oid_ty: None,
            table: None,
            primary_key: vec![],
            io: ColumnIo::default(),
            superclass: None,
            embedding: None,
            mapped_by: None,
            strategy: Selection::Default,
            version: Selection::Default,
            version_columns: vec![],
            version_field: None,
            discriminator: Selection::Default,
            discriminator_value: None,
            discriminator_column: None,
            fields: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type a field declares to hold an instance of this class.
    pub fn ty(&self) -> stmt::Type {
        stmt::Type::Model(self.name.clone())
    }

    /// The declared identity. See [`ClassLayout::identity`] for the resolved
    /// one.
    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn oid_ty(&self) -> Option<&ObjectIdType> {
        self.oid_ty.as_ref()
    }

    /// The configured table name, if any.
    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn primary_key_configs(&self) -> &[ColumnConfig] {
        &self.primary_key
    }

    pub fn io(&self) -> &ColumnIo {
        &self.io
    }

    pub fn superclass(&self) -> Option<&Arc<ClassMapping>> {
        self.superclass.as_ref()
    }

    /// Persistent superclasses, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &ClassMapping> {
        let mut next = self.superclass.as_deref();
        std::iter::from_fn(move || {
            let cls = next?;
            next = cls.superclass.as_deref();
            Some(cls)
        })
    }

    /// This class and its superclasses, root first.
    pub fn hierarchy(&self) -> Vec<&ClassMapping> {
        let mut chain: Vec<_> = self.ancestors().collect();
        chain.reverse();
        chain.push(self);
        chain
    }

    /// Returns `true` if `other` is this class or one of its superclasses.
    pub fn is_assignable_to(&self, other: &ClassMapping) -> bool {
        std::ptr::eq(self, other) || self.ancestors().any(|cls| std::ptr::eq(cls, other))
    }

    pub fn embedding(&self) -> Option<&Embedding> {
        self.embedding.as_ref()
    }

    pub fn strategy(&self) -> &ClassStrategy {
        &self.strategy
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn discriminator(&self) -> &Discriminator {
        &self.discriminator
    }

    /// Fields declared by this class, not including inherited ones.
    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// Looks up a field of this class or a superclass by index.
    pub fn field(&self, index: usize) -> Option<&FieldMapping> {
        self.hierarchy()
            .into_iter()
            .flat_map(|cls| cls.fields.iter())
            .find(|field| field.index() == index)
    }

    /// Number of fields including inherited ones.
    pub fn field_count(&self) -> usize {
        self.superclass.as_ref().map_or(0, |sup| sup.field_count()) + self.fields.len()
    }

    pub fn is_mapped(&self) -> bool {
        self.layout.get().is_some()
    }

    pub fn layout(&self) -> Result<&ClassLayout> {
        self.layout.get().ok_or_else(|| {
            Error::invalid_mapping(format!("class `{}` has not been mapped", self.name))
        })
    }

    pub fn table(&self) -> Result<&Arc<Table>> {
        self.layout()?.table.as_ref().ok_or_else(|| {
            Error::invalid_mapping(format!("class `{}` is not mapped to a table", self.name))
        })
    }

    pub fn primary_key(&self) -> Result<&Arc<[Column]>> {
        Ok(&self.layout()?.primary_key)
    }

    pub(crate) fn commit_layout(&self, layout: ClassLayout) {
        let _ = self.layout.set(layout);
    }
}

impl Embedding {
    /// The class declaring the embedding field.
    pub fn owner(&self) -> &Arc<ClassMapping> {
        &self.owner
    }

    pub fn field_index(&self) -> usize {
        self.field
    }

    /// The embedding field. Validated when the embedded class is built.
    pub fn field(&self) -> &FieldMapping {
        match self.owner.field(self.field) {
            Some(field) => field,
            None => unreachable!("embedding field {} checked at build", self.field),
        }
    }

    /// The class named by a mapped-by back reference, if any.
    pub fn mapped_by(&self) -> Option<&Arc<ClassMapping>> {
        self.mapped_by.as_ref()
    }

    /// The class an embedded class takes its identity from.
    pub fn resolved_owner(&self) -> &Arc<ClassMapping> {
        self.mapped_by.as_ref().unwrap_or(&self.owner)
    }
}

impl ClassBuilder {
    pub fn identity(&mut self, identity: Identity) -> &mut Self {
        self.identity = identity;
        self
    }

    pub fn object_id_type(&mut self, name: impl Into<Arc<str>>, shared: bool) -> &mut Self {
        self.oid_ty = Some(ObjectIdType {
            name: name.into(),
            shared,
        });
        self
    }

    pub fn table(&mut self, name: impl Into<String>) -> &mut Self {
        self.table = Some(name.into());
        self
    }

    pub fn primary_key_column(&mut self, column: ColumnConfig) -> &mut Self {
        self.primary_key.push(column);
        self
    }

    pub fn column_io(&mut self, io: ColumnIo) -> &mut Self {
        self.io = io;
        self
    }

    pub fn superclass(&mut self, superclass: &Arc<ClassMapping>) -> &mut Self {
        self.superclass = Some(superclass.clone());
        self
    }

    /// Embeds the class in the field at `field` of `owner`.
    pub fn embedded_in(&mut self, owner: &Arc<ClassMapping>, field: usize) -> &mut Self {
        self.embedding = Some((owner.clone(), field));
        self
    }

    pub fn mapped_by(&mut self, cls: &Arc<ClassMapping>) -> &mut Self {
        self.mapped_by = Some(cls.clone());
        self
    }

    pub fn strategy(&mut self, strategy: ClassStrategy) -> &mut Self {
        self.strategy = Selection::Strategy(strategy);
        self
    }

    pub fn strategy_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.strategy = Selection::Alias(alias.into());
        self
    }

    pub fn version(&mut self, strategy: VersionStrategy) -> &mut Self {
        self.version = Selection::Strategy(strategy);
        self
    }

    pub fn version_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.version = Selection::Alias(alias.into());
        self
    }

    pub fn version_column(&mut self, column: ColumnConfig) -> &mut Self {
        self.version_columns.push(column);
        self
    }

    /// Mirrors the version into the field at `index` after each load.
    pub fn version_field(&mut self, index: usize) -> &mut Self {
        self.version_field = Some(index);
        self
    }

    pub fn discriminator(&mut self, strategy: DiscriminatorStrategy) -> &mut Self {
        self.discriminator = Selection::Strategy(strategy);
        self
    }

    pub fn discriminator_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        self.discriminator = Selection::Alias(alias.into());
        self
    }

    pub fn discriminator_value(&mut self, value: impl Into<stmt::Value>) -> &mut Self {
        self.discriminator_value = Some(value.into());
        self
    }

    pub fn discriminator_column(&mut self, column: ColumnConfig) -> &mut Self {
        self.discriminator_column = Some(column);
        self
    }

    pub fn field(&mut self, field: &FieldBuilder) -> &mut Self {
        self.fields.push(field.clone());
        self
    }

    /// Builds the class, resolving strategy aliases through `registry`.
    pub fn build(&self, registry: &Registry) -> Result<ClassMapping> {
        self.build_impl(registry)
            .map_err(|err| err.context(stratum_core::err!("failed to build class `{}`", self.name)))
    }

    fn build_impl(&self, registry: &Registry) -> Result<ClassMapping> {
        let superclass = self.superclass.as_ref();

        let embedding = match &self.embedding {
            Some((owner, field)) => {
                if owner.field(*field).is_none() {
                    return Err(Error::invalid_mapping(format!(
                        "class `{}` has no field {field} to embed `{}`",
                        owner.name, self.name
                    )));
                }

                Some(Embedding {
                    owner: owner.clone(),
                    field: *field,
                    mapped_by: self.mapped_by.clone(),
                })
            }
            None => None,
        };

        let strategy = match &self.strategy {
            Selection::Strategy(strategy) => strategy.clone(),
            Selection::Alias(alias) => registry.class_strategy(alias)?,
            Selection::Default => match &embedding {
                Some(embedding) if embedding.field().value().kind() == ValueKind::ObjectId => {
                    ClassStrategy::ObjectId
                }
                Some(_) => ClassStrategy::Embedded,
                None if superclass.is_some() => ClassStrategy::Flat,
                None => ClassStrategy::Full,
            },
        };

        let version = match &self.version {
            Selection::Strategy(strategy) => strategy.clone(),
            Selection::Alias(alias) => registry.version_strategy(alias, superclass)?,
            Selection::Default => match superclass {
                Some(superclass) => VersionStrategy::superclass(superclass),
                None => VersionStrategy::None,
            },
        };

        let discriminator = match &self.discriminator {
            Selection::Strategy(strategy) => strategy.clone(),
            Selection::Alias(alias) => registry.discriminator_strategy(alias, superclass)?,
            Selection::Default => match superclass {
                Some(superclass) => DiscriminatorStrategy::superclass(superclass),
                None => DiscriminatorStrategy::None,
            },
        };

        let first_index = superclass.map_or(0, |sup| sup.field_count());
        let fields = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, field)| field.build(first_index + i, registry))
            .collect::<Result<Vec<_>>>()?;

        Ok(ClassMapping {
            name: self.name.clone(),
            identity: self.identity,
            oid_ty: self.oid_ty.clone(),
            table: self.table.clone(),
            primary_key: self.primary_key.clone(),
            io: self.io.clone(),
            superclass: self.superclass.clone(),
            embedding,
            strategy,
            version: Version::new(version, self.version_columns.clone(), self.version_field),
            discriminator: Discriminator::new(
                discriminator,
                self.discriminator_value.clone(),
                self.discriminator_column.clone(),
            ),
            fields,
            layout: OnceLock::new(),
        })
    }
}
