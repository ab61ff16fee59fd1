use async_trait::async_trait;

use crate::libs::error::Result;
use crate::libs::row::{Row, RowValues};
use crate::libs::schema::TableSchema;

/// Opens storage handles for a table, creating the table on first use
/// with `CREATE TABLE IF NOT EXISTS <table> <columns>`.
#[async_trait]
pub trait Provisioner: Send + Sync {
    type Handle: StorageHandle;

    async fn open_writable(&self, schema: &TableSchema) -> Result<Self::Handle>;

    /// `None` when no handle can be produced.
    async fn open_readable(&self, schema: &TableSchema) -> Result<Option<Self::Handle>>;
}

/// An open connection to one database.
///
/// Dropping a handle releases it; [`StorageHandle::close`] does so
/// gracefully and reports failures.
#[async_trait]
pub trait StorageHandle: Send {
    /// Insert or replace one row inside its own transaction. Returns the
    /// row id, or `None` when the engine reports no row written.
    async fn replace_row(&mut self, table: &str, row: &RowValues) -> Result<Option<i64>>;

    /// Run a statement, returning the number of affected rows.
    async fn execute(&mut self, sql: &str, binds: &[String]) -> Result<u64>;

    async fn query(&mut self, sql: &str, binds: &[String]) -> Result<Vec<Row>>;

    async fn close(self) -> Result<()>;
}
