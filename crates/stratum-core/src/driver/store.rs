use super::{Dictionary, ObjectId, ResultRow, Select};
use crate::{
    async_trait,
    schema::db::{Column, Table},
    Result,
};

use std::sync::Arc;

/// Storage I/O available to strategies during custom hooks and version
/// checks.
///
/// Failures are returned as-is; strategies never retry.
#[async_trait]
pub trait Store: Send + Sync {
    /// The dictionary of the database behind this store.
    fn dictionary(&self) -> &Dictionary;

    /// Runs `select` against the row identified by `id`. Returns `None` when
    /// no such row exists.
    async fn select(&self, select: &Select, id: &ObjectId) -> Result<Option<ResultRow>>;

    /// Opens the large-object handle stored in `target`, locking the row for
    /// update.
    async fn open_large_object(&self, target: &LobTarget) -> Result<Box<dyn LargeObject>>;
}

/// Identifies the large-object cell of one row.
#[derive(Debug, Clone)]
pub struct LobTarget {
    pub table: Arc<Table>,
    pub column: Column,
    pub id: ObjectId,
}

/// A database large-object handle, written to in chunks.
#[async_trait]
pub trait LargeObject: Send {
    /// Discards the current content.
    async fn truncate(&mut self) -> Result<()>;

    /// Writes `bytes` starting at byte `offset`.
    async fn write_bytes(&mut self, offset: u64, bytes: &[u8]) -> Result<()>;

    /// Writes `text` starting at character `offset`.
    async fn write_text(&mut self, offset: u64, text: &str) -> Result<()>;
}
