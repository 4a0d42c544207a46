use super::{ClassMapping, ColumnConfig, MapContext};
use crate::strategy::discriminator::DiscriminatorStrategy;

use stratum_core::{schema::db::Column, stmt::Value, Error, Result};

use std::sync::{Arc, OnceLock};

/// Type-tag metadata of a class.
#[derive(Debug)]
pub struct Discriminator {
    strategy: DiscriminatorStrategy,
    value: Option<Value>,
    column: Option<ColumnConfig>,
    must_carry: OnceLock<bool>,
    resolved: OnceLock<Arc<[Column]>>,
}

pub(crate) struct MappedDiscriminator {
    must_carry: bool,
    columns: Arc<[Column]>,
}

impl Discriminator {
    pub(crate) fn new(
        strategy: DiscriminatorStrategy,
        value: Option<Value>,
        column: Option<ColumnConfig>,
    ) -> Discriminator {
        Discriminator {
            strategy,
            value,
            column,
            must_carry: OnceLock::new(),
            resolved: OnceLock::new(),
        }
    }

    pub fn strategy(&self) -> &DiscriminatorStrategy {
        &self.strategy
    }

    /// The configured literal, if any.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn column_config(&self) -> Option<&ColumnConfig> {
        self.column.as_ref()
    }

    /// The literal identifying `cls` in a discriminator column. Defaults to
    /// the class name.
    pub fn literal(cls: &ClassMapping) -> Value {
        cls.discriminator()
            .value
            .clone()
            .unwrap_or_else(|| Value::from(cls.name()))
    }

    /// Whether rows of this class carry a discriminator value.
    pub fn must_carry_value(&self) -> bool {
        self.must_carry.get().copied().unwrap_or(false)
    }

    pub fn columns(&self) -> Result<&Arc<[Column]>> {
        self.resolved
            .get()
            .ok_or_else(|| Error::invalid_mapping("discriminator has not been mapped"))
    }

    /// Plans the discriminator columns of `cls` and decides whether its rows
    /// must carry a value: they must once the class or any ancestor declares
    /// a literal or stores literals in a value map.
    pub(crate) fn map(
        &self,
        cls: &ClassMapping,
        cx: &mut MapContext<'_>,
    ) -> Result<MappedDiscriminator> {
        let columns = self.strategy.map(cls, cx)?;

        let must_carry = std::iter::once(cls).chain(cls.ancestors()).any(|cls| {
            let discriminator = cls.discriminator();
            discriminator.value.is_some()
                || matches!(discriminator.strategy, DiscriminatorStrategy::ValueMap)
        });

        Ok(MappedDiscriminator {
            must_carry,
            columns: columns.into(),
        })
    }

    pub(crate) fn commit(&self, mapped: MappedDiscriminator) {
        let _ = self.must_carry.set(mapped.must_carry);
        let _ = self.resolved.set(mapped.columns);
    }
}
