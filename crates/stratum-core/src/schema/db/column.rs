use super::Type;
use crate::stmt;

/// A physical column, as planned by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// The name of the column in the database.
    pub name: String,

    /// The column type, from the object model's point of view.
    pub ty: stmt::Type,

    /// The database storage type of the column.
    pub storage_ty: Type,

    /// Declared size. `None` means unsized, e.g. a LOB column.
    pub size: Option<u64>,

    /// Whether or not the column accepts `NULL`.
    pub nullable: bool,

    /// The column's default literal, if it declares one.
    pub default: Option<String>,
}

impl Column {
    /// A nullable, unsized column with no default. Storage type is resolved
    /// later by the column planner.
    pub fn new(name: impl Into<String>, ty: stmt::Type) -> Column {
        let storage_ty = Type::from_app_default(&ty);
        Column {
            name: name.into(),
            ty,
            storage_ty,
            size: None,
            nullable: true,
            default: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Column {
        self.size = Some(size);
        self
    }

    pub fn not_null(mut self) -> Column {
        self.nullable = false;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Column {
        self.default = Some(default.into());
        self
    }

    pub fn with_storage_ty(mut self, storage_ty: Type) -> Column {
        self.storage_ty = storage_ty;
        self
    }

    pub fn is_not_null(&self) -> bool {
        !self.nullable
    }
}
