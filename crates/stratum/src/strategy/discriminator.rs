//! Type tags telling which class a row belongs to.

mod value_map;

use crate::mapping::{ClassMapping, MapContext, Repository};

use stratum_core::{
    driver::{ResultRow, RowManager, Select},
    schema::db::Column,
    stmt::Expr,
    Error, Result, StateManager,
};

use std::{fmt, sync::Arc};

#[derive(Debug, Clone)]
pub enum DiscriminatorStrategy {
    /// No discriminator; rows are instances of the class they are read as
    None,

    /// Whatever the superclass's discriminator does
    Superclass(SuperclassDiscriminator),

    /// A literal per class in a discriminator column
    ValueMap,

    Custom(Arc<dyn CustomDiscriminatorStrategy>),
}

/// Forwards to the discriminator of a superclass. Holds no state of its own.
#[derive(Clone)]
pub struct SuperclassDiscriminator {
    superclass: Arc<ClassMapping>,
}

/// A user-provided discriminator strategy.
pub trait CustomDiscriminatorStrategy: fmt::Debug + Send + Sync {
    fn alias(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn map(&self, cls: &ClassMapping, cx: &mut MapContext<'_>) -> Result<Vec<Column>>;

    fn load_subclasses(&self, cls: &ClassMapping, repo: &Repository) -> Vec<Arc<ClassMapping>> {
        let _ = (cls, repo);
        vec![]
    }

    fn class_of(
        &self,
        cls: &ClassMapping,
        repo: &Repository,
        base: &Arc<ClassMapping>,
        result: &ResultRow,
    ) -> Result<Arc<ClassMapping>> {
        let _ = (cls, repo, result);
        Ok(base.clone())
    }

    fn has_class_conditions(
        &self,
        cls: &ClassMapping,
        repo: &Repository,
        base: &ClassMapping,
        subclasses: bool,
    ) -> bool {
        let _ = (cls, repo, base, subclasses);
        false
    }

    fn class_conditions(
        &self,
        cls: &ClassMapping,
        repo: &Repository,
        base: &ClassMapping,
        subclasses: bool,
    ) -> Result<Option<Expr>> {
        let _ = (cls, repo, base, subclasses);
        Ok(None)
    }

    /// Writes the discriminator of `instance`, an instance of a class using
    /// this strategy's class `cls`.
    fn insert(
        &self,
        cls: &ClassMapping,
        instance: &ClassMapping,
        sm: &dyn StateManager,
        rows: &mut RowManager,
    ) -> Result<()> {
        let _ = (cls, instance, sm, rows);
        Ok(())
    }
}

impl DiscriminatorStrategy {
    /// A strategy delegating to the discriminator of `superclass`.
    pub fn superclass(superclass: &Arc<ClassMapping>) -> DiscriminatorStrategy {
        DiscriminatorStrategy::Superclass(SuperclassDiscriminator {
            superclass: superclass.clone(),
        })
    }

    pub fn alias(&self) -> &str {
        match self {
            DiscriminatorStrategy::None => "none",
            DiscriminatorStrategy::Superclass(_) => "superclass",
            DiscriminatorStrategy::ValueMap => "value-map",
            DiscriminatorStrategy::Custom(strategy) => strategy.alias(),
        }
    }

    /// The strategy doing the actual work for `cls`, and the class whose
    /// discriminator it is.
    pub fn resolve<'a>(
        &'a self,
        cls: &'a ClassMapping,
    ) -> (&'a DiscriminatorStrategy, &'a ClassMapping) {
        match self {
            DiscriminatorStrategy::Superclass(delegate) => {
                let superclass = &*delegate.superclass;
                superclass.discriminator().strategy().resolve(superclass)
            }
            strategy => (strategy, cls),
        }
    }

    /// Plans the discriminator columns of `cls`.
    pub fn map(&self, cls: &ClassMapping, cx: &mut MapContext<'_>) -> Result<Vec<Column>> {
        let config = cls.discriminator().column_config();

        match self {
            DiscriminatorStrategy::None | DiscriminatorStrategy::Superclass(_) => match config {
                None => Ok(vec![]),
                Some(_) => Err(Error::invalid_mapping(format!(
                    "discriminator column configured but strategy `{}` declares none",
                    self.alias()
                ))),
            },
            DiscriminatorStrategy::ValueMap => value_map::map(config, cx),
            DiscriminatorStrategy::Custom(strategy) => strategy.map(cls, cx),
        }
    }

    /// The discriminator columns of `cls`, wherever they are declared.
    pub fn columns<'a>(&'a self, cls: &'a ClassMapping) -> Result<&'a Arc<[Column]>> {
        let (_, owner) = self.resolve(cls);
        owner.discriminator().columns()
    }

    /// Lists the subclasses rows of `cls` may belong to. Empty when there is
    /// nothing to discover.
    pub fn load_subclasses(&self, cls: &ClassMapping, repo: &Repository) -> Vec<Arc<ClassMapping>> {
        match self.resolve(cls) {
            (DiscriminatorStrategy::ValueMap, owner) => repo.subclasses(owner),
            (DiscriminatorStrategy::Custom(strategy), owner) => strategy.load_subclasses(owner, repo),
            _ => vec![],
        }
    }

    /// The class of the instance stored in `result`, read as `base` or one of
    /// its subclasses.
    pub fn class_of(
        &self,
        cls: &ClassMapping,
        repo: &Repository,
        base: &Arc<ClassMapping>,
        result: &ResultRow,
    ) -> Result<Arc<ClassMapping>> {
        match self.resolve(cls) {
            (DiscriminatorStrategy::ValueMap, owner) => value_map::class_of(owner, repo, base, result),
            (DiscriminatorStrategy::Custom(strategy), owner) => {
                strategy.class_of(owner, repo, base, result)
            }
            _ => Ok(base.clone()),
        }
    }

    /// Whether selecting `base` (and its subclasses, with `subclasses`) has
    /// to filter rows by discriminator.
    pub fn has_class_conditions(
        &self,
        cls: &ClassMapping,
        repo: &Repository,
        base: &ClassMapping,
        subclasses: bool,
    ) -> bool {
        match self.resolve(cls) {
            (DiscriminatorStrategy::ValueMap, _) => {
                value_map::has_class_conditions(repo, base, subclasses)
            }
            (DiscriminatorStrategy::Custom(strategy), owner) => {
                strategy.has_class_conditions(owner, repo, base, subclasses)
            }
            _ => false,
        }
    }

    /// The filter restricting a select to rows of `base` (and its
    /// subclasses, with `subclasses`). `None` when no filter is needed.
    pub fn class_conditions(
        &self,
        cls: &ClassMapping,
        repo: &Repository,
        base: &ClassMapping,
        subclasses: bool,
    ) -> Result<Option<Expr>> {
        match self.resolve(cls) {
            (DiscriminatorStrategy::ValueMap, owner) => {
                value_map::class_conditions(owner, repo, base, subclasses)
            }
            (DiscriminatorStrategy::Custom(strategy), owner) => {
                strategy.class_conditions(owner, repo, base, subclasses)
            }
            _ => Ok(None),
        }
    }

    /// Writes the discriminator of a new instance of `cls`.
    pub fn insert(&self, cls: &ClassMapping, sm: &dyn StateManager, rows: &mut RowManager) -> Result<()> {
        match self.resolve(cls) {
            (DiscriminatorStrategy::ValueMap, owner) => value_map::insert(owner, cls, rows),
            (DiscriminatorStrategy::Custom(strategy), owner) => strategy.insert(owner, cls, sm, rows),
            _ => Ok(()),
        }
    }

    /// Adds the discriminator columns to `select`. Returns `true` if anything
    /// was selected.
    pub fn select(&self, cls: &ClassMapping, select: &mut Select) -> Result<bool> {
        let columns = self.columns(cls)?;
        for column in columns.iter() {
            select.column(column);
        }
        Ok(!columns.is_empty())
    }
}

impl fmt::Debug for SuperclassDiscriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuperclassDiscriminator")
            .field("superclass", &self.superclass.name())
            .finish()
    }
}
