//! Sort compiler: ordered (path, direction) pairs to an ORDER BY
//! fragment.
//!
//! Terms render as aggregates (`min` ascending, `max` descending)
//! because the assembly layer wraps queries in a group-by: one logical
//! structure spans multiple index rows when enumerable members are
//! present. Root-id sorts use the grouped `s.[Id]` directly.

use crate::core::Result;
use crate::query::ast::{SortDirection, SortExpr};
use crate::query::fragment::SqlFragment;
use crate::query::translate::resolve_column;
use crate::schema::StructureSchema;

pub struct SortCompiler;

impl SortCompiler {
    pub fn compile(schema: &StructureSchema, sorts: &[SortExpr]) -> Result<SqlFragment> {
        let mut terms = Vec::with_capacity(sorts.len());
        for sort in sorts {
            let column = resolve_column(schema, &sort.path)?;
            let term = if column.is_root_id {
                match sort.direction {
                    SortDirection::Asc => "s.[Id] asc".to_string(),
                    SortDirection::Desc => "s.[Id] desc".to_string(),
                }
            } else {
                match sort.direction {
                    SortDirection::Asc => format!("min({}) asc", column.sql),
                    SortDirection::Desc => format!("max({}) desc", column.sql),
                }
            };
            terms.push(term);
        }
        Ok(SqlFragment::new(terms.join(", "), Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StoreError;
    use crate::query::ast::{asc, desc};
    use crate::schema::{IdKind, MemberDef, SchemaBuilder, TypeDef, TypeReflector};

    fn schema() -> StructureSchema {
        let child = TypeDef::new("Address")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("City"));
        let def = TypeDef::new("Order")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("Number"))
            .member(MemberDef::integer("Qty"))
            .member(MemberDef::nested("Child", child));
        SchemaBuilder::build(&TypeReflector::reflect(&def).unwrap()).unwrap()
    }

    #[test]
    fn test_terms_are_comma_joined_aggregates() {
        let frag = SortCompiler::compile(&schema(), &[asc("Number"), desc("Qty")]).unwrap();
        assert_eq!(frag.sql, "min(si.[Number]) asc, max(si.[Qty]) desc");
    }

    #[test]
    fn test_id_sort_renders_translated_name() {
        let frag = SortCompiler::compile(&schema(), &[asc("Id")]).unwrap();
        assert_eq!(frag.sql, "s.[Id] asc");
    }

    #[test]
    fn test_nested_id_sort_uses_reference_column() {
        let s = schema();
        let frag = SortCompiler::compile(&s, &[desc("Child.Id")]).unwrap();
        let column = s.find_by_path("Child.StructureId").unwrap().name();
        assert_eq!(frag.sql, format!("max(si.[{}]) desc", column));
    }

    #[test]
    fn test_unknown_sort_member_fails() {
        let err = SortCompiler::compile(&schema(), &[asc("Missing")]).unwrap_err();
        assert!(matches!(err, StoreError::Compile(_)));
    }
}
