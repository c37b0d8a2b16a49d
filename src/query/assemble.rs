//! Query assembly: composes the compiled fragments into the full select
//! against the Structure and Indexes tables.
//!
//! Shape:
//! `select s.[Json] from [<T>Structure] as s inner join [<T>Indexes] as si
//!  on si.[Id] = s.[Id] where ... group by s.[Id], s.[Json] order by ...;`
//!
//! The group-by collapses the repeated index rows of enumerable members
//! back to one row per structure.

use crate::core::Result;
use crate::query::ast::{Expr, IncludeExpr, SortExpr};
use crate::query::fragment::SqlFragment;
use crate::query::include::IncludeCompiler;
use crate::query::predicate::PredicateCompiler;
use crate::query::sort::SortCompiler;
use crate::schema::StructureSchema;
use crate::storage::StorageLayout;
use crate::storage::ddl::quote_ident;

/// One query over a structure set: optional predicate, ordered sorts,
/// eager includes.
#[derive(Debug, Clone, Default)]
pub struct QueryDef {
    pub predicate: Option<Expr>,
    pub sorts: Vec<SortExpr>,
    pub includes: Vec<IncludeExpr>,
}

impl QueryDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, expr: Expr) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    pub fn sort(mut self, sort: SortExpr) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn include(mut self, include: IncludeExpr) -> Self {
        self.includes.push(include);
        self
    }
}

pub struct QueryAssembler;

impl QueryAssembler {
    pub fn assemble(schema: &StructureSchema, def: &QueryDef) -> Result<SqlFragment> {
        let structure_table = quote_ident(&StorageLayout::structure_table_name(schema.name()));
        let indexes_table = quote_ident(&StorageLayout::indexes_table_name(schema.name()));

        let mut sql = String::from("select s.[Json]");
        let mut params = Vec::new();

        if !def.includes.is_empty() {
            let includes = IncludeCompiler::compile(schema, &def.includes)?;
            sql.push_str(", ");
            sql.push_str(&includes.sql);
        }

        sql.push_str(&format!(
            " from {} as s inner join {} as si on si.[Id] = s.[Id]",
            structure_table, indexes_table
        ));

        if let Some(predicate) = &def.predicate {
            let compiled = PredicateCompiler::compile(schema, predicate)?;
            sql.push_str(" where ");
            sql.push_str(&compiled.sql);
            params = compiled.params;
        }

        sql.push_str(" group by s.[Id], s.[Json]");

        if def.sorts.is_empty() {
            sql.push_str(" order by s.[Id]");
        } else {
            let sorts = SortCompiler::compile(schema, &def.sorts)?;
            sql.push_str(" order by ");
            sql.push_str(&sorts.sql);
        }
        sql.push(';');

        Ok(SqlFragment::new(sql, params))
    }
}
