//! The one member-name translation rule shared by all three
//! sub-compilers.
//!
//! The id member's logical name always rewrites to the fixed internal
//! name `StructureId` before column lookup: `Id` and the type's own id
//! member name translate at the root, `Child.Id` translates in nested
//! paths. The root `StructureId` has no member column and resolves to
//! the Indexes table's fixed `Id` column; nested references resolve to
//! their generated columns.

use crate::core::{DataKind, Result, StoreError};
use crate::schema::StructureSchema;
use crate::storage::ddl::quote_ident;

pub const STRUCTURE_ID_NAME: &str = "StructureId";

pub fn translate_path(schema: &StructureSchema, path: &str) -> String {
    let id_name = schema.id_accessor().map(|a| a.member_name());
    let mut segments: Vec<&str> = path.split('.').collect();
    if let Some(last) = segments.last_mut() {
        if *last == "Id" || Some(*last) == id_name {
            *last = STRUCTURE_ID_NAME;
        }
    }
    segments.join(".")
}

#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    /// Qualified, quoted column reference, e.g. `si.[Name]`.
    pub sql: String,
    pub data_kind: DataKind,
    /// The path resolved to the root id rather than a member column.
    pub is_root_id: bool,
}

pub fn resolve_column(schema: &StructureSchema, path: &str) -> Result<ResolvedColumn> {
    let translated = translate_path(schema, path);

    if translated == STRUCTURE_ID_NAME {
        let data_kind = schema
            .id_accessor()
            .map_or(DataKind::Guid, |a| a.kind().data_kind());
        return Ok(ResolvedColumn {
            sql: format!("si.{}", quote_ident("Id")),
            data_kind,
            is_root_id: true,
        });
    }

    let accessor = schema.find_by_path(&translated).ok_or_else(|| {
        StoreError::Compile(format!(
            "unknown member '{}' on type '{}'",
            path,
            schema.name()
        ))
    })?;

    if !accessor.data_kind().is_comparable() {
        return Err(StoreError::Compile(format!(
            "binary member unsupported: '{}'",
            path
        )));
    }

    Ok(ResolvedColumn {
        sql: format!("si.{}", quote_ident(accessor.name())),
        data_kind: accessor.data_kind(),
        is_root_id: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IdKind, MemberDef, SchemaBuilder, TypeDef, TypeReflector};

    fn schema() -> StructureSchema {
        let child = TypeDef::new("Address")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("City"));
        let def = TypeDef::new("Order")
            .with_id("OrderId", IdKind::Guid)
            .member(MemberDef::text("Number"))
            .member(MemberDef::bytes("Payload"))
            .member(MemberDef::nested("Child", child));
        SchemaBuilder::build(&TypeReflector::reflect(&def).unwrap()).unwrap()
    }

    #[test]
    fn test_id_translates_to_structure_id() {
        let s = schema();
        assert_eq!(translate_path(&s, "Id"), "StructureId");
        assert_eq!(translate_path(&s, "OrderId"), "StructureId");
        assert_eq!(translate_path(&s, "Child.Id"), "Child.StructureId");
        assert_eq!(translate_path(&s, "Number"), "Number");
    }

    #[test]
    fn test_root_id_resolves_to_fixed_column() {
        let col = resolve_column(&schema(), "Id").unwrap();
        assert!(col.is_root_id);
        assert_eq!(col.sql, "si.[Id]");
    }

    #[test]
    fn test_nested_id_resolves_to_reference_column() {
        let s = schema();
        let col = resolve_column(&s, "Child.Id").unwrap();
        assert!(!col.is_root_id);
        let expected = s.find_by_path("Child.StructureId").unwrap();
        assert_eq!(col.sql, format!("si.[{}]", expected.name()));
    }

    #[test]
    fn test_unknown_member_is_a_compile_error() {
        let err = resolve_column(&schema(), "Missing").unwrap_err();
        assert!(matches!(err, StoreError::Compile(_)));
    }

    #[test]
    fn test_binary_member_is_rejected() {
        let err = resolve_column(&schema(), "Payload").unwrap_err();
        assert!(err.to_string().contains("binary member unsupported"));
    }
}
