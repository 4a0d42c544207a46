use crate::{
    schema::db::{Column, Table},
    stmt::Expr,
};

use std::sync::Arc;

/// Selection fragments contributed by strategies. The query compiler turns
/// them into SQL; strategies only add to it.
#[derive(Debug, Default, Clone)]
pub struct Select {
    columns: Vec<Column>,
    conditions: Vec<Expr>,
    joins: Joins,
    for_update: bool,
}

/// How eagerly related data is fetched along with the primary select.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EagerMode {
    /// Related data is loaded on first access
    #[default]
    None,

    /// Related data is joined into the primary select
    Join,

    /// Related data is loaded by an independent select per relation
    Parallel,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Joins {
    joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub from: Arc<Table>,
    pub to: Arc<Table>,

    /// Pairs of `(from column, to column)` names joined by equality.
    pub on: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Outer,
}

impl Select {
    pub fn new() -> Select {
        Select::default()
    }

    /// Adds `column` to the selected columns. Columns are selected once.
    pub fn column(&mut self, column: &Column) -> &mut Self {
        if !self.columns.iter().any(|c| c.name == column.name) {
            self.columns.push(column.clone());
        }
        self
    }

    pub fn filter(&mut self, expr: Expr) -> &mut Self {
        self.conditions.push(expr);
        self
    }

    pub fn for_update(&mut self) -> &mut Self {
        self.for_update = true;
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn conditions(&self) -> &[Expr] {
        &self.conditions
    }

    pub fn joins(&self) -> &Joins {
        &self.joins
    }

    pub fn joins_mut(&mut self) -> &mut Joins {
        &mut self.joins
    }

    pub fn is_for_update(&self) -> bool {
        self.for_update
    }
}

impl Joins {
    pub fn new() -> Joins {
        Joins::default()
    }

    /// Adds a join unless an identical one is already present.
    pub fn join(mut self, join: Join) -> Joins {
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
        self
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Join> {
        self.joins.iter()
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }
}

impl Join {
    /// Joins `from` to `to` on columns with matching positions.
    pub fn on_columns(
        kind: JoinKind,
        from: &Arc<Table>,
        from_columns: &[Column],
        to: &Arc<Table>,
        to_columns: &[Column],
    ) -> Join {
        Join {
            kind,
            from: from.clone(),
            to: to.clone(),
            on: from_columns
                .iter()
                .zip(to_columns)
                .map(|(lhs, rhs)| (lhs.name.clone(), rhs.name.clone()))
                .collect(),
        }
    }
}
