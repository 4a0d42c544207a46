use super::{map, ClassBuilder, ClassMapping, MapContext};
use crate::strategy::{codec::EnumStorage, Registry};

use stratum_core::{
    schema::db,
    stmt::TypeEnum,
    Dictionary, Error, Result,
};

use indexmap::IndexMap;
use std::sync::Arc;

/// Owns the class mappings of one persistence unit and maps them against a
/// database.
#[derive(Debug)]
pub struct Repository {
    dictionary: Dictionary,
    adapt_schema: bool,
    table_name_prefix: String,
    enum_storage: EnumStorage,
    schema: db::Schema,
    enums: IndexMap<Arc<str>, Arc<TypeEnum>>,
    registry: Registry,
    classes: IndexMap<Arc<str>, Arc<ClassMapping>>,
}

#[derive(Debug)]
pub struct Builder {
    dictionary: Dictionary,
    adapt_schema: bool,
    table_name_prefix: Option<String>,
    enum_storage: EnumStorage,
    tables: Vec<String>,
    enums: Vec<TypeEnum>,
    registry: Registry,
}

impl Repository {
    pub fn builder() -> Builder {
        Builder {
            dictionary: Dictionary::GENERIC,
            adapt_schema: true,
            table_name_prefix: None,
            enum_storage: EnumStorage::Ordinal,
            tables: vec![],
            enums: vec![],
            registry: Registry::new(),
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn schema(&self) -> &db::Schema {
        &self.schema
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn enum_type(&self, name: &str) -> Option<&Arc<TypeEnum>> {
        self.enums.get(name)
    }

    /// Builds `builder` and registers the class. Superclasses and owners must
    /// be registered first.
    pub fn add_class(&mut self, builder: &ClassBuilder) -> Result<Arc<ClassMapping>> {
        let cls = Arc::new(builder.build(&self.registry)?);

        if self.classes.contains_key(cls.name()) {
            return Err(Error::invalid_mapping(format!(
                "class `{}` is registered more than once",
                cls.name()
            )));
        }

        self.classes.insert(cls.name().into(), cls.clone());
        Ok(cls)
    }

    pub fn class(&self, name: &str) -> Option<&Arc<ClassMapping>> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl ExactSizeIterator<Item = &Arc<ClassMapping>> {
        self.classes.values()
    }

    /// Every registered class extending `cls`, directly or not.
    pub fn subclasses(&self, cls: &ClassMapping) -> Vec<Arc<ClassMapping>> {
        self.classes
            .values()
            .filter(|candidate| {
                candidate
                    .ancestors()
                    .any(|ancestor| std::ptr::eq(ancestor, cls))
            })
            .cloned()
            .collect()
    }

    /// Maps every registered class that is not mapped yet.
    pub fn map_all(&mut self) -> Result<()> {
        let classes: Vec<_> = self.classes.values().cloned().collect();

        let mut cx = MapContext {
            schema: &mut self.schema,
            dictionary: &self.dictionary,
            adapt: self.adapt_schema,
            table_name_prefix: &self.table_name_prefix,
            enums: &self.enums,
            enum_storage: self.enum_storage,
        };

        for cls in &classes {
            map::map_class(&mut cx, cls)?;
        }

        Ok(())
    }
}

impl Builder {
    pub fn dictionary(&mut self, dictionary: Dictionary) -> &mut Self {
        self.dictionary = dictionary;
        self
    }

    /// Whether mapping may create tables missing from the schema.
    pub fn adapt_schema(&mut self, adapt: bool) -> &mut Self {
        self.adapt_schema = adapt;
        self
    }

    /// Set the table name prefix for derived table names
    pub fn table_name_prefix(&mut self, prefix: &str) -> &mut Self {
        self.table_name_prefix = Some(prefix.to_string());
        self
    }

    pub fn enum_storage(&mut self, storage: EnumStorage) -> &mut Self {
        self.enum_storage = storage;
        self
    }

    /// Declares tables that already exist in the database.
    pub fn tables<I, S>(&mut self, tables: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Registers enum types and their constants.
    pub fn enums(&mut self, enums: impl IntoIterator<Item = TypeEnum>) -> &mut Self {
        self.enums.extend(enums);
        self
    }

    pub fn registry(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn build(&self) -> Result<Repository> {
        let mut schema = db::Schema::new();
        for table in &self.tables {
            schema.add_table(table);
        }

        let mut enums = IndexMap::new();
        for ty in &self.enums {
            if enums.insert(ty.name.clone(), Arc::new(ty.clone())).is_some() {
                return Err(Error::invalid_mapping(format!(
                    "enum type `{}` is registered more than once",
                    ty.name
                )));
            }
        }

        Ok(Repository {
            dictionary: self.dictionary.clone(),
            adapt_schema: self.adapt_schema,
            table_name_prefix: self.table_name_prefix.clone().unwrap_or_default(),
            enum_storage: self.enum_storage,
            schema,
            enums,
            registry: self.registry.clone(),
            classes: IndexMap::new(),
        })
    }
}
