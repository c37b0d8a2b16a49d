// ============================================================================
// docustore Library
// ============================================================================
//
// Turns an ordinary relational database into a schema-flexible document
// store. Object graphs are serialized to JSON bodies while a queryable
// index row-set and uniqueness rows are derived from a per-type schema;
// queries are written with a native expression DSL and compiled to
// parameterized SQL against the index tables.

pub mod core;
pub mod facade;
pub mod query;
pub mod schema;
pub mod serializer;
pub mod storage;
pub mod structure;

// Re-export main types for convenience
pub use core::{DataKind, IndexValue, Result, StoreError};
pub use facade::{StoreConfig, StructureStore};
pub use query::{
    BinaryOp, Expr, IncludeCompiler, IncludeExpr, MemberRef, PredicateCompiler, QueryAssembler,
    QueryDef, SortCompiler, SortDirection, SortExpr, SqlFragment, StringOp, asc, desc, member, not,
};
pub use schema::{
    IdKind, IdMember, IndexAccessor, IndexableMember, MemberDef, MemberKind, SchemaBuilder,
    SchemaCache, Storable, StructureSchema, StructureType, TypeDef, TypeReflector, Uniqueness,
    column_name,
};
pub use serializer::{JsonSerializer, Serializer};
pub use storage::{
    BulkLoader, ColumnLayout, DEFAULT_CHUNK_SIZE, DbClient, DbRow, SchemaSynchronizer,
    StorageLayout, TableLayout,
};
pub use structure::{Structure, StructureBuilder, StructureId, StructureIndex, StructureUnique};
