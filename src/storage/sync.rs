//! Schema synchronizer: reconciles the three physical tables of a type
//! with its current structure schema.
//!
//! Per-type state machine `Unknown -> Upserted`, memoized for the
//! synchronizer's lifetime. Concurrent upserts of the same type collapse
//! into one DDL run; different types never block each other. Column
//! add/drop is not guarded against concurrent row writers; callers
//! quiesce write traffic around column-changing synchronizations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

use crate::core::{Result, StoreError};
use crate::schema::StructureSchema;
use crate::storage::client::DbClient;
use crate::storage::ddl;
use crate::storage::layout::{ID_COLUMN, StorageLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    Unknown,
    Upserted,
}

pub struct SchemaSynchronizer {
    client: Arc<dyn DbClient>,
    states: Mutex<HashMap<String, Arc<AsyncMutex<SyncState>>>>,
}

impl SchemaSynchronizer {
    pub fn new(client: Arc<dyn DbClient>) -> Self {
        Self { client, states: Mutex::new(HashMap::new()) }
    }

    fn state_entry(&self, type_name: &str) -> Result<Arc<AsyncMutex<SyncState>>> {
        let mut map = self.states.lock()?;
        Ok(Arc::clone(
            map.entry(type_name.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(SyncState::Unknown))),
        ))
    }

    /// Ensure the type's tables exist and the Indexes table's column set
    /// matches the schema's accessors. No-op once upserted during this
    /// synchronizer's lifetime. The memo is only written after every DDL
    /// step succeeded; a failure leaves the type `Unknown` so a later
    /// call re-attempts full synchronization.
    pub async fn upsert(&self, schema: &StructureSchema) -> Result<()> {
        let entry = self.state_entry(schema.name())?;
        let mut state = entry.lock().await;
        if *state == SyncState::Upserted {
            debug!(type_name = %schema.name(), "schema already upserted, skipping");
            return Ok(());
        }

        let layout = StorageLayout::for_schema(schema);
        self.ensure_tables(&layout).await?;
        self.sync_index_columns(&layout).await?;

        *state = SyncState::Upserted;
        info!(type_name = %schema.name(), "schema upserted");
        Ok(())
    }

    /// Drop all three physical tables and clear the memo so a later
    /// upsert recreates from scratch.
    pub async fn drop_schema(&self, schema: &StructureSchema) -> Result<()> {
        let entry = self.state_entry(schema.name())?;
        let mut state = entry.lock().await;

        let layout = StorageLayout::for_schema(schema);
        for table in [&layout.uniques.name, &layout.indexes.name, &layout.structure.name] {
            if self.client.table_exists(table).await? {
                self.run_ddl(&ddl::drop_table(table)).await?;
            }
        }

        *state = SyncState::Unknown;
        info!(type_name = %schema.name(), "schema dropped");
        Ok(())
    }

    async fn ensure_tables(&self, layout: &StorageLayout) -> Result<()> {
        let creates = [
            (&layout.structure.name, ddl::create_structure_table(layout)),
            (&layout.indexes.name, ddl::create_indexes_table(layout)),
            (&layout.uniques.name, ddl::create_uniques_table(layout)),
        ];
        for (table, create_sql) in creates {
            if !self.client.table_exists(table).await? {
                debug!(table = %table, "creating table");
                self.run_ddl(&create_sql).await?;
            }
        }
        Ok(())
    }

    /// Diff the live Indexes table against the schema's accessor column
    /// set: absent accessor columns are added as nullable, live columns
    /// outside the accessor set (other than `Id`) are dropped.
    async fn sync_index_columns(&self, layout: &StorageLayout) -> Result<()> {
        let live = self.client.list_columns(&layout.indexes.name).await?;

        for column in layout.indexes.columns.iter().skip(1) {
            if !live.iter().any(|c| c == &column.name) {
                debug!(table = %layout.indexes.name, column = %column.name, "adding index column");
                self.run_ddl(&ddl::add_column(&layout.indexes, column)).await?;
            }
        }

        for column in &live {
            if column != ID_COLUMN && layout.indexes.find(column).is_none() {
                debug!(table = %layout.indexes.name, column = %column, "dropping stale index column");
                self.run_ddl(&ddl::drop_column(&layout.indexes, column)).await?;
            }
        }

        Ok(())
    }

    async fn run_ddl(&self, sql: &str) -> Result<()> {
        self.client
            .execute(sql, &[])
            .await
            .map_err(|e| StoreError::Sync(format!("DDL failed: {} ({})", e, sql)))?;
        Ok(())
    }
}
