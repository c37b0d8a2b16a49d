//! Runtime schema: id, index and unique accessors over serialized
//! instances.
//!
//! Accessors operate on `serde_json::Value` trees, so one extraction
//! rule covers every type; no per-type code is generated.

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::core::{DataKind, IndexValue, Result, StoreError};
use crate::schema::type_def::{IdKind, Uniqueness};
use crate::structure::StructureId;

/// Reads and assigns the id member of serialized instances.
#[derive(Debug, Clone)]
pub struct IdAccessor {
    member: String,
    kind: IdKind,
}

impl IdAccessor {
    pub(crate) fn new(member: impl Into<String>, kind: IdKind) -> Self {
        Self { member: member.into(), kind }
    }

    pub fn member_name(&self) -> &str {
        &self.member
    }

    pub fn kind(&self) -> IdKind {
        self.kind
    }

    pub fn get(&self, root: &JsonValue) -> Result<Option<StructureId>> {
        match root.get(&self.member) {
            None | Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) if self.kind.is_guid() => Uuid::parse_str(s)
                .map(|u| Some(StructureId::Guid(u)))
                .map_err(|_| {
                    StoreError::Schema(format!("id member '{}' holds an invalid GUID", self.member))
                }),
            Some(JsonValue::Number(n)) if self.kind.is_identity() => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(|v| Some(StructureId::Identity(v)))
                .ok_or_else(|| {
                    StoreError::Schema(format!(
                        "id member '{}' is out of the 32-bit identity range",
                        self.member
                    ))
                }),
            Some(other) => Err(StoreError::Schema(format!(
                "id member '{}' holds {} which does not match its {:?} kind",
                self.member,
                other,
                self.kind
            ))),
        }
    }

    pub fn set(&self, root: &mut JsonValue, id: &StructureId) -> Result<()> {
        let matches_kind = match id {
            StructureId::Guid(_) => self.kind.is_guid(),
            StructureId::Identity(_) => self.kind.is_identity(),
        };
        if !matches_kind {
            return Err(StoreError::Schema(format!(
                "cannot assign {} to id member '{}' of kind {:?}",
                id, self.member, self.kind
            )));
        }
        let obj = root.as_object_mut().ok_or_else(|| {
            StoreError::Serialization("structure must serialize to a JSON object".to_string())
        })?;
        let value = match id {
            StructureId::Guid(u) => JsonValue::String(u.hyphenated().to_string()),
            StructureId::Identity(i) => JsonValue::Number((*i).into()),
        };
        obj.insert(self.member.clone(), value);
        Ok(())
    }
}

/// Extracts 0..N comparable values from an instance for one member path.
#[derive(Debug, Clone)]
pub struct IndexAccessor {
    path: String,
    json_path: String,
    column: String,
    data_kind: DataKind,
    enumerable: bool,
    uniqueness: Uniqueness,
}

impl IndexAccessor {
    pub(crate) fn new(
        path: impl Into<String>,
        json_path: impl Into<String>,
        column: impl Into<String>,
        data_kind: DataKind,
        enumerable: bool,
        uniqueness: Uniqueness,
    ) -> Self {
        Self {
            path: path.into(),
            json_path: json_path.into(),
            column: column.into(),
            data_kind,
            enumerable,
            uniqueness,
        }
    }

    /// The generated column name, stable across process runs.
    pub fn name(&self) -> &str {
        &self.column
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data_kind(&self) -> DataKind {
        self.data_kind
    }

    pub fn is_enumerable(&self) -> bool {
        self.enumerable
    }

    pub fn uniqueness(&self) -> Uniqueness {
        self.uniqueness
    }

    /// Walk the serialized instance and collect this member's values.
    ///
    /// Collections fan out, transitively through nested collections. An
    /// absent non-enumerable member yields a single null so the index row
    /// keeps its column; an absent enumerable member yields nothing.
    pub fn values(&self, root: &JsonValue) -> Result<Vec<IndexValue>> {
        let segments: Vec<&str> = self.json_path.split('.').collect();
        let mut out = Vec::new();
        collect_values(root, &segments, self.data_kind, &mut out)?;
        if out.is_empty() && !self.enumerable {
            out.push(IndexValue::Null);
        }
        Ok(out)
    }
}

fn collect_values(
    node: &JsonValue,
    segments: &[&str],
    kind: DataKind,
    out: &mut Vec<IndexValue>,
) -> Result<()> {
    match segments.split_first() {
        None => match node {
            // Terminal arrays are collection fan-out, except byte members
            // whose natural serialization already is a number array.
            JsonValue::Array(items) if kind != DataKind::Bytes => {
                for item in items {
                    collect_values(item, segments, kind, out)?;
                }
            }
            _ => out.push(IndexValue::from_json(node, kind)?),
        },
        Some((head, rest)) => match node {
            JsonValue::Array(items) => {
                for item in items {
                    collect_values(item, segments, kind, out)?;
                }
            }
            _ => {
                if let Some(child) = node.get(*head) {
                    collect_values(child, rest, kind, out)?;
                }
            }
        },
    }
    Ok(())
}

/// The runtime-usable schema of one persisted type: id accessor plus the
/// ordered index accessors with their generated column names.
#[derive(Debug, Clone)]
pub struct StructureSchema {
    name: String,
    id: Option<IdAccessor>,
    indexes: Vec<IndexAccessor>,
}

impl StructureSchema {
    pub(crate) fn new(
        name: impl Into<String>,
        id: Option<IdAccessor>,
        indexes: Vec<IndexAccessor>,
    ) -> Self {
        Self { name: name.into(), id, indexes }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_accessor(&self) -> Option<&IdAccessor> {
        self.id.as_ref()
    }

    pub fn index_accessors(&self) -> &[IndexAccessor] {
        &self.indexes
    }

    pub fn find_by_path(&self, path: &str) -> Option<&IndexAccessor> {
        self.indexes.iter().find(|a| a.path() == path)
    }

    pub fn find_by_column(&self, column: &str) -> Option<&IndexAccessor> {
        self.indexes.iter().find(|a| a.name() == column)
    }

    pub fn unique_accessors(&self) -> impl Iterator<Item = &IndexAccessor> {
        self.indexes
            .iter()
            .filter(|a| a.uniqueness() != Uniqueness::None)
    }

    pub fn per_type_uniques(&self) -> impl Iterator<Item = &IndexAccessor> {
        self.indexes
            .iter()
            .filter(|a| a.uniqueness() == Uniqueness::PerType)
    }

    pub fn per_instance_uniques(&self) -> impl Iterator<Item = &IndexAccessor> {
        self.indexes
            .iter()
            .filter(|a| a.uniqueness() == Uniqueness::PerInstance)
    }
}
