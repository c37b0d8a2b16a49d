//! Structure store facade.
//!
//! Thin orchestration over the schema cache, synchronizer, compilers
//! and bulk loader; no storage logic of its own. This is the operation
//! surface a unit-of-work/session layer consumes.

use std::sync::Arc;

use tracing::info;

use crate::core::{IndexValue, Result, StoreError};
use crate::query::{
    Expr, IncludeCompiler, IncludeExpr, PredicateCompiler, QueryAssembler, QueryDef, SortCompiler,
    SortExpr, SqlFragment,
};
use crate::schema::{SchemaCache, Storable, StructureSchema, TypeDef};
use crate::serializer::{JsonSerializer, Serializer, from_tree};
use crate::storage::{BulkLoader, DbClient, SchemaSynchronizer};
use crate::structure::{Structure, StructureBuilder, StructureId};

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Batch size for bulk loading (bounds per-chunk memory).
    pub chunk_size: usize,
    /// Synchronize a type's schema automatically before its first insert.
    pub auto_upsert: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::storage::DEFAULT_CHUNK_SIZE,
            auto_upsert: true,
        }
    }
}

/// Facade over one database: schemas are cached and synchronized per
/// store instance, inserts go through the bulk loader, queries through
/// the expression compilers.
///
/// # Examples
///
/// ```ignore
/// let store = StructureStore::new(client);
/// store.insert_many(&customers).await?;
///
/// let adults = store
///     .query::<Customer>(&QueryDef::new().filter(member("Age").gt_eq(18)))
///     .await?;
/// ```
pub struct StructureStore {
    client: Arc<dyn DbClient>,
    serializer: Arc<dyn Serializer>,
    cache: SchemaCache,
    synchronizer: SchemaSynchronizer,
    loader: BulkLoader,
    config: StoreConfig,
}

impl StructureStore {
    pub fn new(client: Arc<dyn DbClient>) -> Self {
        Self::with_config(client, StoreConfig::default())
    }

    pub fn with_config(client: Arc<dyn DbClient>, config: StoreConfig) -> Self {
        Self {
            serializer: Arc::new(JsonSerializer),
            cache: SchemaCache::new(),
            synchronizer: SchemaSynchronizer::new(Arc::clone(&client)),
            loader: BulkLoader::with_chunk_size(Arc::clone(&client), config.chunk_size),
            client,
            config,
        }
    }

    /// Replace the default JSON serializer.
    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn schema<T: Storable>(&self) -> Result<Arc<StructureSchema>> {
        self.cache.get_or_build_for::<T>()
    }

    pub fn schema_of(&self, def: &TypeDef) -> Result<Arc<StructureSchema>> {
        self.cache.get_or_build(def)
    }

    /// Remove a cached schema, e.g. after a structural migration; the
    /// next reference rebuilds it.
    pub fn invalidate_schema(&self, type_name: &str) -> Result<bool> {
        self.cache.remove(type_name)
    }

    pub async fn upsert_schema(&self, schema: &StructureSchema) -> Result<()> {
        self.synchronizer.upsert(schema).await
    }

    pub async fn drop_schema(&self, schema: &StructureSchema) -> Result<()> {
        self.synchronizer.drop_schema(schema).await
    }

    pub fn compile_predicate(&self, schema: &StructureSchema, expr: &Expr) -> Result<SqlFragment> {
        PredicateCompiler::compile(schema, expr)
    }

    pub fn compile_sort(&self, schema: &StructureSchema, sorts: &[SortExpr]) -> Result<SqlFragment> {
        SortCompiler::compile(schema, sorts)
    }

    pub fn compile_include(
        &self,
        schema: &StructureSchema,
        includes: &[IncludeExpr],
    ) -> Result<SqlFragment> {
        IncludeCompiler::compile(schema, includes)
    }

    /// Insert a batch. Builds one transient [`Structure`] per item and
    /// drives the three row streams through the bulk loader. Returns the
    /// assigned ids in batch order.
    pub async fn insert_many<T: Storable>(&self, items: &[T]) -> Result<Vec<StructureId>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let schema = self.schema::<T>()?;
        if self.config.auto_upsert {
            self.synchronizer.upsert(&schema).await?;
        }

        let structures = items
            .iter()
            .map(|item| StructureBuilder::build(&schema, item, self.serializer.as_ref()))
            .collect::<Result<Vec<Structure>>>()?;
        let ids = structures.iter().map(|s| s.id).collect();

        self.loader.insert(&schema, &structures).await?;
        info!(type_name = %schema.name(), count = items.len(), "inserted structures");
        Ok(ids)
    }

    /// Run a query and return the raw JSON bodies.
    pub async fn query_json<T: Storable>(&self, def: &QueryDef) -> Result<Vec<String>> {
        let schema = self.schema::<T>()?;
        let fragment = QueryAssembler::assemble(&schema, def)?;
        let rows = self.client.query(&fragment.sql, &fragment.params).await?;

        rows.into_iter()
            .map(|row| match row.into_iter().next() {
                Some(IndexValue::Text(json)) => Ok(json),
                other => Err(StoreError::Client(format!(
                    "expected a Json text column, got {:?}",
                    other
                ))),
            })
            .collect()
    }

    /// Run a query and materialize the results.
    pub async fn query<T: Storable>(&self, def: &QueryDef) -> Result<Vec<T>> {
        self.query_json::<T>(def)
            .await?
            .into_iter()
            .map(|json| from_tree(self.serializer.deserialize_text(&json)?))
            .collect()
    }
}
