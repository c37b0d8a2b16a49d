//! Database client collaborator interface.
//!
//! The engine never talks to the network itself; everything it needs
//! from a backend is behind this trait. All operations are scoped by the
//! client's current transaction when one is open via `begin`.

use async_trait::async_trait;

use crate::core::{IndexValue, Result};

/// One result/insert row, positionally matched to a column list.
pub type DbRow = Vec<IndexValue>;

#[async_trait]
pub trait DbClient: Send + Sync {
    /// Execute a statement (DDL or DML) and return the affected row count.
    async fn execute(&self, sql: &str, params: &[IndexValue]) -> Result<u64>;

    /// Run a query and materialize all rows.
    async fn query(&self, sql: &str, params: &[IndexValue]) -> Result<Vec<DbRow>>;

    /// Bulk-load rows into a table. `columns` fixes the positional order
    /// of every row. Constraint violations must surface as the backend's
    /// native error, untranslated.
    async fn bulk_load(&self, table: &str, columns: &[String], rows: Vec<DbRow>) -> Result<()>;

    async fn list_columns(&self, table: &str) -> Result<Vec<String>>;

    async fn table_exists(&self, table: &str) -> Result<bool>;

    async fn begin(&self) -> Result<()>;

    async fn commit(&self) -> Result<()>;

    async fn rollback(&self) -> Result<()>;
}
