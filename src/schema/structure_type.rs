use crate::core::DataKind;
use crate::schema::type_def::{IdKind, Uniqueness};

/// Immutable descriptor of a persisted type, produced once by the
/// reflector. All later consumers (schema builder, compilers, loader)
/// walk this static tree and never re-inspect the type definition.
#[derive(Debug, Clone)]
pub struct StructureType {
    pub name: String,
    pub id_member: Option<IdMember>,
    pub indexable_members: Vec<IndexableMember>,
}

#[derive(Debug, Clone)]
pub struct IdMember {
    pub name: String,
    pub kind: IdKind,
}

/// One indexable member path reachable from the root.
#[derive(Debug, Clone)]
pub struct IndexableMember {
    /// Logical dotted path. Nested id references are already rewritten to
    /// end in `StructureId`, which is what column naming and query-path
    /// lookup operate on.
    pub path: String,
    /// Dotted path with the original member names, used when extracting
    /// values from serialized instances.
    pub json_path: String,
    pub data_kind: DataKind,
    /// The member or one of its ancestors is a collection; extraction
    /// yields 0..N values per instance.
    pub is_enumerable: bool,
    pub uniqueness: Uniqueness,
}
