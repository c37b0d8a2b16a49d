//! Bulk loader: turns a batch of structures into three parallel table
//! row streams and drives them through the client's bulk-load primitive.
//!
//! Each chunk is loaded under one shared transaction; a failure on any
//! stream rolls back the whole chunk. Uniqueness is not pre-validated
//! beyond intra-chunk deduplication; violations surface as the backend's
//! native constraint error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::core::{IndexValue, Result};
use crate::schema::StructureSchema;
use crate::storage::client::{DbClient, DbRow};
use crate::storage::layout::StorageLayout;
use crate::structure::{Structure, StructureId};

/// Keeps per-chunk memory bounded and stays inside common backend bulk
/// batch limits.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

pub struct BulkLoader {
    client: Arc<dyn DbClient>,
    chunk_size: usize,
}

impl BulkLoader {
    pub fn new(client: Arc<dyn DbClient>) -> Self {
        Self::with_chunk_size(client, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(client: Arc<dyn DbClient>, chunk_size: usize) -> Self {
        Self { client, chunk_size: chunk_size.max(1) }
    }

    pub async fn insert(&self, schema: &StructureSchema, structures: &[Structure]) -> Result<()> {
        if structures.is_empty() {
            return Ok(());
        }
        let layout = StorageLayout::for_schema(schema);
        for (n, chunk) in structures.chunks(self.chunk_size).enumerate() {
            debug!(
                type_name = %schema.name(),
                chunk = n,
                size = chunk.len(),
                "bulk loading chunk"
            );
            self.load_chunk(&layout, chunk).await?;
        }
        Ok(())
    }

    async fn load_chunk(&self, layout: &StorageLayout, chunk: &[Structure]) -> Result<()> {
        self.client.begin().await?;
        match self.load_streams(layout, chunk).await {
            Ok(()) => self.client.commit().await,
            Err(e) => {
                // Best effort: the original failure is what the caller
                // must see, even if rollback itself fails.
                let _ = self.client.rollback().await;
                Err(e)
            }
        }
    }

    async fn load_streams(&self, layout: &StorageLayout, chunk: &[Structure]) -> Result<()> {
        self.client
            .bulk_load(
                &layout.structure.name,
                &layout.structure.column_names(),
                structure_rows(chunk),
            )
            .await?;
        self.client
            .bulk_load(
                &layout.indexes.name,
                &layout.indexes.column_names(),
                index_rows(layout, chunk),
            )
            .await?;
        let uniques = unique_rows(chunk);
        if !uniques.is_empty() {
            self.client
                .bulk_load(&layout.uniques.name, &layout.uniques.column_names(), uniques)
                .await?;
        }
        Ok(())
    }
}

fn structure_rows(chunk: &[Structure]) -> Vec<DbRow> {
    chunk
        .iter()
        .map(|s| vec![s.id.to_value(), IndexValue::Text(s.serialized_body.clone())])
        .collect()
}

/// One wide row per instance; each further element of an enumerable
/// accessor yields a sparse continuation row carrying only that
/// accessor's column.
fn index_rows(layout: &StorageLayout, chunk: &[Structure]) -> Vec<DbRow> {
    let mut rows = Vec::with_capacity(chunk.len());
    for s in chunk {
        let mut grouped: HashMap<&str, Vec<&IndexValue>> = HashMap::new();
        for entry in &s.indexes {
            grouped.entry(entry.name.as_str()).or_default().push(&entry.value);
        }

        let row_count = grouped.values().map(Vec::len).max().unwrap_or(0).max(1);
        for k in 0..row_count {
            let mut row = Vec::with_capacity(layout.indexes.columns.len());
            row.push(s.id.to_value());
            for column in layout.indexes.columns.iter().skip(1) {
                let value = grouped
                    .get(column.name.as_str())
                    .and_then(|values| values.get(k))
                    .map_or(IndexValue::Null, |v| (*v).clone());
                row.push(value);
            }
            rows.push(row);
        }
    }
    rows
}

/// Unique rows deduplicated by `(name, value, scope)` within the chunk,
/// so duplicate values inside one object graph do not trip the
/// uniqueness constraint on insert.
fn unique_rows(chunk: &[Structure]) -> Vec<DbRow> {
    let mut seen: HashSet<(String, String, Option<StructureId>)> = HashSet::new();
    let mut rows = Vec::new();
    for s in chunk {
        for unique in &s.uniques {
            let key = (unique.name.clone(), unique.value.clone(), unique.scope_id);
            if seen.insert(key) {
                rows.push(vec![
                    s.id.to_value(),
                    unique.scope_id.map_or(IndexValue::Null, |id| id.to_value()),
                    IndexValue::Text(unique.name.clone()),
                    IndexValue::Text(unique.value.clone()),
                ]);
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IdKind, MemberDef, SchemaBuilder, TypeDef, TypeReflector};
    use crate::structure::{StructureIndex, StructureUnique};
    use uuid::Uuid;

    fn layout() -> StorageLayout {
        let def = TypeDef::new("Order")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("Number"))
            .member(MemberDef::text("Tags").collection());
        let schema = SchemaBuilder::build(&TypeReflector::reflect(&def).unwrap()).unwrap();
        StorageLayout::for_schema(&schema)
    }

    fn order(tags: &[&str]) -> Structure {
        let id = StructureId::Guid(Uuid::new_v4());
        let mut indexes = vec![StructureIndex {
            name: "Number".into(),
            value: IndexValue::Text("N-1".into()),
        }];
        for tag in tags {
            indexes.push(StructureIndex { name: "Tags".into(), value: IndexValue::Text((*tag).into()) });
        }
        Structure { id, serialized_body: "{}".into(), indexes, uniques: Vec::new() }
    }

    #[test]
    fn test_single_valued_instance_is_one_row() {
        let rows = index_rows(&layout(), &[order(&["a"])]);
        assert_eq!(rows.len(), 1);
        // Id, Number, Tags
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn test_enumerable_values_pack_as_continuation_rows() {
        let rows = index_rows(&layout(), &[order(&["a", "b", "c"])]);
        assert_eq!(rows.len(), 3);

        // row 0 carries the single-valued member, continuation rows do not
        assert_eq!(rows[0][1], IndexValue::Text("N-1".into()));
        assert_eq!(rows[1][1], IndexValue::Null);
        assert_eq!(rows[1][2], IndexValue::Text("b".into()));
        assert_eq!(rows[2][2], IndexValue::Text("c".into()));
    }

    #[test]
    fn test_unique_rows_deduplicate_within_chunk() {
        let id = StructureId::Guid(Uuid::new_v4());
        let unique = |value: &str| StructureUnique {
            name: "ProductNo".into(),
            value: value.into(),
            scope_id: Some(id),
        };
        let s = Structure {
            id,
            serialized_body: "{}".into(),
            indexes: Vec::new(),
            uniques: vec![unique("P1"), unique("P1"), unique("P2")],
        };
        let rows = unique_rows(&[s]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_unique_scope_renders_null_for_per_type() {
        let id = StructureId::Guid(Uuid::new_v4());
        let s = Structure {
            id,
            serialized_body: "{}".into(),
            indexes: Vec::new(),
            uniques: vec![StructureUnique { name: "Email".into(), value: "a@b".into(), scope_id: None }],
        };
        let rows = unique_rows(&[s]);
        assert_eq!(rows[0][1], IndexValue::Null);
        assert_eq!(rows[0][3], IndexValue::Text("a@b".into()));
    }
}
