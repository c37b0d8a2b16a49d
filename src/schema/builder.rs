//! Schema builder: a pure, deterministic function from a reflected
//! [`StructureType`] to the runtime [`StructureSchema`].
//!
//! Column names must stay stable across process runs so existing index
//! tables keep matching. First-level simple paths use the literal member
//! name for debuggability; every other path gets a fixed-width xxh3 hash
//! of the full dotted path.

use std::collections::HashSet;

use xxhash_rust::xxh3::xxh3_64;

use crate::core::{Result, StoreError};
use crate::schema::schema::{IdAccessor, IndexAccessor, StructureSchema};
use crate::schema::structure_type::StructureType;

/// Longest member name rendered literally as a column name.
pub const MAX_LITERAL_COLUMN_LEN: usize = 32;

/// Generated column name for a member path. Deterministic: the same path
/// always maps to the same column, in any process.
pub fn column_name(path: &str) -> String {
    // "Id" is reserved for the fixed key column of the Indexes table.
    if !path.contains('.') && path.len() <= MAX_LITERAL_COLUMN_LEN && path != "Id" {
        path.to_string()
    } else {
        format!("ix_{:016x}", xxh3_64(path.as_bytes()))
    }
}

pub struct SchemaBuilder;

impl SchemaBuilder {
    pub fn build(structure_type: &StructureType) -> Result<StructureSchema> {
        let id = structure_type
            .id_member
            .as_ref()
            .map(|m| IdAccessor::new(m.name.clone(), m.kind));

        let mut columns = HashSet::new();
        let mut indexes = Vec::with_capacity(structure_type.indexable_members.len());
        for member in &structure_type.indexable_members {
            let column = column_name(&member.path);
            if !columns.insert(column.clone()) {
                return Err(StoreError::Schema(format!(
                    "column name '{}' generated for path '{}' collides with another member of '{}'",
                    column, member.path, structure_type.name
                )));
            }
            indexes.push(IndexAccessor::new(
                member.path.clone(),
                member.json_path.clone(),
                column,
                member.data_kind,
                member.is_enumerable,
                member.uniqueness,
            ));
        }

        Ok(StructureSchema::new(structure_type.name.clone(), id, indexes))
    }
}
