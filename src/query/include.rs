//! Include compiler: eager-loads referenced structures' bodies.
//!
//! Each entry renders a correlated sub-select that pulls the referenced
//! type's JSON by equality on the reference column, aliased by the
//! path's derived member name. The correlation goes through `min` so
//! the projection stays valid inside the assembly layer's group-by.

use crate::core::{DataKind, Result, StoreError};
use crate::query::ast::IncludeExpr;
use crate::query::fragment::SqlFragment;
use crate::query::translate::resolve_column;
use crate::schema::StructureSchema;
use crate::storage::StorageLayout;
use crate::storage::ddl::quote_ident;

pub struct IncludeCompiler;

impl IncludeCompiler {
    pub fn compile(schema: &StructureSchema, includes: &[IncludeExpr]) -> Result<SqlFragment> {
        let mut parts = Vec::with_capacity(includes.len());
        for (i, include) in includes.iter().enumerate() {
            let column = resolve_column(schema, &include.path)?;
            if column.is_root_id {
                return Err(StoreError::Compile(format!(
                    "include path '{}' references the type's own id",
                    include.path
                )));
            }
            if !matches!(column.data_kind, DataKind::Guid | DataKind::Integer) {
                return Err(StoreError::Compile(format!(
                    "include path '{}' must be an id-valued member",
                    include.path
                )));
            }

            let table = StorageLayout::structure_table_name(&include.referenced_type);
            let alias = format!("cs{}", i);
            parts.push(format!(
                "(select {alias}.[Json] from {table} as {alias} where {alias}.[Id] = min({column})) as {name}",
                alias = alias,
                table = quote_ident(&table),
                column = column.sql,
                name = quote_ident(&include.alias()),
            ));
        }
        Ok(SqlFragment::new(parts.join(", "), Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IdKind, MemberDef, SchemaBuilder, TypeDef, TypeReflector};

    fn schema() -> StructureSchema {
        let address = TypeDef::new("Address")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::text("City"));
        let def = TypeDef::new("Order")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::guid("DeliveryAddressId"))
            .member(MemberDef::text("Number"))
            .member(MemberDef::nested("Billing", address));
        SchemaBuilder::build(&TypeReflector::reflect(&def).unwrap()).unwrap()
    }

    #[test]
    fn test_include_renders_correlated_subselect() {
        let includes = [IncludeExpr::new("DeliveryAddressId", "Address")];
        let frag = IncludeCompiler::compile(&schema(), &includes).unwrap();
        assert_eq!(
            frag.sql,
            "(select cs0.[Json] from [AddressStructure] as cs0 \
             where cs0.[Id] = min(si.[DeliveryAddressId])) as [DeliveryAddress]"
        );
    }

    #[test]
    fn test_nested_reference_include() {
        let s = schema();
        let includes = [IncludeExpr::new("Billing.StructureId", "Address")];
        let frag = IncludeCompiler::compile(&s, &includes).unwrap();
        let column = s.find_by_path("Billing.StructureId").unwrap().name();
        assert!(frag.sql.contains(&format!("min(si.[{}])", column)));
        assert!(frag.sql.ends_with("as [Billing]"));
    }

    #[test]
    fn test_non_id_member_is_rejected() {
        let includes = [IncludeExpr::new("Number", "Address")];
        let err = IncludeCompiler::compile(&schema(), &includes).unwrap_err();
        assert!(matches!(err, StoreError::Compile(_)));
    }

    #[test]
    fn test_own_id_is_rejected() {
        let includes = [IncludeExpr::new("Id", "Order")];
        assert!(IncludeCompiler::compile(&schema(), &includes).is_err());
    }
}
