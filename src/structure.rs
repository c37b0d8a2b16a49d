//! Instance-level structure model.
//!
//! A [`Structure`] is built fresh for every insert or update and
//! discarded once the database operation completes: the assigned id, the
//! serialized body and the derived index/unique rows.

use std::fmt;

use uuid::Uuid;

use crate::core::{IndexValue, Result, StoreError};
use crate::schema::{Storable, StructureSchema, Uniqueness};
use crate::serializer::Serializer;

/// Id of one persisted structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureId {
    Guid(Uuid),
    Identity(i32),
}

impl StructureId {
    pub fn to_value(&self) -> IndexValue {
        match self {
            Self::Guid(u) => IndexValue::Guid(*u),
            Self::Identity(i) => IndexValue::Integer(i64::from(*i)),
        }
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guid(u) => write!(f, "{}", u.hyphenated()),
            Self::Identity(i) => write!(f, "{}", i),
        }
    }
}

/// One index entry: accessor column name plus one extracted value.
/// Enumerable members produce multiple entries sharing the same name.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureIndex {
    pub name: String,
    pub value: IndexValue,
}

/// One uniqueness entry. `scope_id` is `None` for per-type uniqueness and
/// the owning structure's id for per-instance uniqueness.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureUnique {
    pub name: String,
    pub value: String,
    pub scope_id: Option<StructureId>,
}

#[derive(Debug, Clone)]
pub struct Structure {
    pub id: StructureId,
    pub serialized_body: String,
    pub indexes: Vec<StructureIndex>,
    pub uniques: Vec<StructureUnique>,
}

pub struct StructureBuilder;

impl StructureBuilder {
    /// Build the transient structure for one instance: serialize, ensure
    /// the id, run the accessors, re-serialize the (possibly id-mutated)
    /// tree as the body.
    pub fn build<T: Storable>(
        schema: &StructureSchema,
        item: &T,
        serializer: &dyn Serializer,
    ) -> Result<Structure> {
        let mut tree = serde_json::to_value(item)?;
        let id = Self::ensure_id(schema, &mut tree)?;

        let mut indexes = Vec::new();
        let mut uniques = Vec::new();
        for accessor in schema.index_accessors() {
            let values = accessor.values(&tree)?;
            for value in values {
                if accessor.uniqueness() != Uniqueness::None && !value.is_null() {
                    uniques.push(StructureUnique {
                        name: accessor.name().to_string(),
                        value: value.canonical_text(),
                        scope_id: match accessor.uniqueness() {
                            Uniqueness::PerInstance => Some(id),
                            _ => None,
                        },
                    });
                }
                indexes.push(StructureIndex {
                    name: accessor.name().to_string(),
                    value,
                });
            }
        }

        let serialized_body = serializer.serialize_value(&tree)?;
        Ok(Structure { id, serialized_body, indexes, uniques })
    }

    fn ensure_id(schema: &StructureSchema, tree: &mut serde_json::Value) -> Result<StructureId> {
        let accessor = schema.id_accessor().ok_or_else(|| {
            StoreError::Schema(format!(
                "type '{}' has no id member; assign external ids before insert",
                schema.name()
            ))
        })?;

        if let Some(id) = accessor.get(tree)? {
            return Ok(id);
        }

        if accessor.kind().is_guid() {
            let id = StructureId::Guid(Uuid::new_v4());
            accessor.set(tree, &id)?;
            Ok(id)
        } else {
            Err(StoreError::Schema(format!(
                "type '{}' uses identity ids; assign them before insert",
                schema.name()
            )))
        }
    }
}
