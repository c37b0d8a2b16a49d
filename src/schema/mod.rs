pub mod builder;
pub mod cache;
pub mod reflect;
#[allow(clippy::module_inception)]
pub mod schema;
pub mod structure_type;
pub mod type_def;
pub mod validate;

pub use builder::{SchemaBuilder, column_name};
pub use cache::SchemaCache;
pub use reflect::TypeReflector;
pub use schema::{IdAccessor, IndexAccessor, StructureSchema};
pub use structure_type::{IdMember, IndexableMember, StructureType};
pub use type_def::{IdKind, MemberDef, MemberKind, Storable, TypeDef, Uniqueness};
