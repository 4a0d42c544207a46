//! Large-result-set collections.
//!
//! A collection too large to materialize is never loaded in full. Its
//! elements are reached through a join from the owner's row, one element
//! mapping at a time, and loaded row by row.

use crate::mapping::ClassMapping;

use stratum_core::{
    async_trait,
    driver::{EagerMode, Join, JoinKind, Joins, ResultRow, Select},
    schema::db::{Column, Table},
    stmt::Value,
    Result, StateManager, Store,
};

use std::{fmt, sync::Arc};

/// Columns of `table` referencing the `target_columns` of `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub table: Arc<Table>,
    pub columns: Vec<Column>,
    pub target: Arc<Table>,
    pub target_columns: Vec<Column>,
}

impl ForeignKey {
    /// Joins the referenced table to the rows holding the key.
    pub fn join(&self, kind: JoinKind) -> Join {
        Join::on_columns(
            kind,
            &self.target,
            &self.target_columns,
            &self.table,
            &self.columns,
        )
    }
}

#[async_trait]
pub trait LrsCollectionStrategy: fmt::Debug + Send + Sync {
    fn alias(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// The element mappings that need a select of their own. With
    /// `traverse`, subclasses of each element mapping are listed too.
    fn independent_element_mappings(&self, traverse: bool) -> Vec<Arc<ClassMapping>>;

    /// The key joining rows of `element` back to the owner's row.
    fn join_foreign_key(&self, element: &ClassMapping) -> Result<ForeignKey>;

    /// Columns holding the data of `element`.
    fn element_columns(&self, element: &ClassMapping) -> Result<Vec<Column>>;

    /// Adds what is needed to read `element` rows to `select`, starting from
    /// `joins`.
    fn select_element(
        &self,
        select: &mut Select,
        element: &ClassMapping,
        eager: EagerMode,
        joins: Joins,
    ) -> Result<()> {
        let _ = eager;

        *select.joins_mut() = self.join_element_relation(joins, element)?;
        for column in self.element_columns(element)? {
            select.column(&column);
        }

        Ok(())
    }

    /// Reads one element from a row selected by
    /// [`LrsCollectionStrategy::select_element`].
    async fn load_element(
        &self,
        sm: &dyn StateManager,
        store: &dyn Store,
        element: &ClassMapping,
        result: &ResultRow,
    ) -> Result<Value>;

    /// Joins from the owner's row to the rows of `element`.
    fn join_element_relation(&self, joins: Joins, element: &ClassMapping) -> Result<Joins> {
        let fk = self.join_foreign_key(element)?;
        Ok(joins.join(fk.join(JoinKind::Inner)))
    }
}
