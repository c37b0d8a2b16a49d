//! Predicate compiler: boolean expression tree to a parameterized,
//! parenthesized infix SQL fragment.
//!
//! Precedence is the tree's own nesting; connectives parenthesize their
//! operands, comparisons render bare. Parameters are numbered in the
//! order literals are encountered, left to right.

use crate::core::{IndexValue, Result, StoreError};
use crate::query::ast::{BinaryOp, Expr, StringOp};
use crate::query::fragment::{SqlFragment, param_name};
use crate::query::translate::resolve_column;
use crate::schema::StructureSchema;

pub struct PredicateCompiler;

impl PredicateCompiler {
    pub fn compile(schema: &StructureSchema, expr: &Expr) -> Result<SqlFragment> {
        let mut params = Vec::new();
        let sql = Self::render(schema, expr, &mut params)?;
        Ok(SqlFragment::new(sql, params))
    }

    fn render(schema: &StructureSchema, expr: &Expr, params: &mut Vec<IndexValue>) -> Result<String> {
        match expr {
            Expr::Binary { left, op, right } => Self::render_binary(schema, left, *op, right, params),

            Expr::StringMatch { member, op, pattern } => {
                let column = resolve_column(schema, member)?;
                if !column.data_kind.is_textual() {
                    return Err(StoreError::Compile(format!(
                        "string operator on non-text member '{}'",
                        member
                    )));
                }
                let rendered = match op {
                    StringOp::StartsWith => format!("{}%", escape_like(pattern)),
                    StringOp::EndsWith => format!("%{}", escape_like(pattern)),
                    StringOp::Contains => format!("%{}%", escape_like(pattern)),
                    StringOp::Like => pattern.clone(),
                };
                params.push(IndexValue::Text(rendered));
                Ok(format!("{} like {}", column.sql, param_name(params.len() - 1)))
            }

            Expr::IsNull { member, negated } => {
                let column = resolve_column(schema, member)?;
                let negation = if *negated { "not " } else { "" };
                Ok(format!("{} is {}null", column.sql, negation))
            }

            Expr::Not(inner) => {
                let rendered = Self::render(schema, inner, params)?;
                Ok(format!("(not {})", rendered))
            }

            Expr::Member(path) => Err(StoreError::Compile(format!(
                "member '{}' cannot stand alone as a predicate",
                path
            ))),

            Expr::Literal(value) => Err(StoreError::Compile(format!(
                "literal {} cannot stand alone as a predicate",
                value
            ))),
        }
    }

    fn render_binary(
        schema: &StructureSchema,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        params: &mut Vec<IndexValue>,
    ) -> Result<String> {
        match op {
            BinaryOp::And | BinaryOp::Or => {
                let connective = if op == BinaryOp::And { "and" } else { "or" };
                let lhs = Self::render(schema, left, params)?;
                let rhs = Self::render(schema, right, params)?;
                Ok(format!("({} {} {})", lhs, connective, rhs))
            }

            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => {
                let Expr::Member(path) = left else {
                    return Err(StoreError::Compile(
                        "comparison must have a member on its left side".to_string(),
                    ));
                };
                let Expr::Literal(value) = right else {
                    return Err(StoreError::Compile(
                        "comparison must have a literal on its right side".to_string(),
                    ));
                };
                let Some(symbol) = op.sql() else {
                    unreachable!();
                };
                let column = resolve_column(schema, path)?;

                if value.is_null() {
                    return match op {
                        BinaryOp::Eq => Ok(format!("{} is null", column.sql)),
                        BinaryOp::NotEq => Ok(format!("{} is not null", column.sql)),
                        _ => Err(StoreError::Compile(format!(
                            "operator '{}' cannot compare '{}' against null",
                            op, path
                        ))),
                    };
                }

                params.push(value.clone());
                Ok(format!(
                    "{} {} {}",
                    column.sql,
                    symbol,
                    param_name(params.len() - 1)
                ))
            }

            _ => Err(StoreError::Compile(format!("unsupported operator '{}'", op))),
        }
    }
}

/// Escape LIKE wildcards in a user-supplied fragment with the dialect's
/// bracket escaping; `[` first so the escapes themselves survive.
fn escape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '[' => out.push_str("[[]"),
            '%' => out.push_str("[%]"),
            '_' => out.push_str("[_]"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::{member, not};
    use crate::schema::{IdKind, MemberDef, SchemaBuilder, TypeDef, TypeReflector};

    fn schema() -> StructureSchema {
        let def = TypeDef::new("Item")
            .with_id("Id", IdKind::Guid)
            .member(MemberDef::integer("Int1"))
            .member(MemberDef::text("String1"))
            .member(MemberDef::bytes("Blob1"));
        SchemaBuilder::build(&TypeReflector::reflect(&def).unwrap()).unwrap()
    }

    #[test]
    fn test_and_of_two_comparisons() {
        let expr = member("Int1").eq(42).and(member("String1").eq("A"));
        let frag = PredicateCompiler::compile(&schema(), &expr).unwrap();
        assert_eq!(frag.sql, "(si.[Int1] = @p0 and si.[String1] = @p1)");
        assert_eq!(
            frag.params,
            vec![IndexValue::Integer(42), IndexValue::Text("A".into())]
        );
    }

    #[test]
    fn test_nesting_preserves_source_precedence() {
        let expr = member("Int1")
            .eq(1)
            .or(member("Int1").eq(2).and(member("String1").eq("x")));
        let frag = PredicateCompiler::compile(&schema(), &expr).unwrap();
        assert_eq!(
            frag.sql,
            "(si.[Int1] = @p0 or (si.[Int1] = @p1 and si.[String1] = @p2))"
        );
    }

    #[test]
    fn test_null_literal_renders_is_null() {
        let frag = PredicateCompiler::compile(&schema(), &member("String1").eq(None::<String>)).unwrap();
        assert_eq!(frag.sql, "si.[String1] is null");
        assert!(frag.params.is_empty());

        let frag =
            PredicateCompiler::compile(&schema(), &member("String1").not_eq(None::<String>)).unwrap();
        assert_eq!(frag.sql, "si.[String1] is not null");
    }

    #[test]
    fn test_null_ordering_comparison_fails() {
        let err = PredicateCompiler::compile(&schema(), &member("Int1").lt(None::<i32>)).unwrap_err();
        assert!(matches!(err, StoreError::Compile(_)));
    }

    #[test]
    fn test_not_wraps_in_parens() {
        let frag = PredicateCompiler::compile(&schema(), &not(member("Int1").eq(1))).unwrap();
        assert_eq!(frag.sql, "(not si.[Int1] = @p0)");
    }

    #[test]
    fn test_string_operators_escape_wildcards() {
        let frag =
            PredicateCompiler::compile(&schema(), &member("String1").starts_with("50%")).unwrap();
        assert_eq!(frag.sql, "si.[String1] like @p0");
        assert_eq!(frag.params, vec![IndexValue::Text("50[%]%".into())]);

        let frag =
            PredicateCompiler::compile(&schema(), &member("String1").contains("a_b")).unwrap();
        assert_eq!(frag.params, vec![IndexValue::Text("%a[_]b%".into())]);
    }

    #[test]
    fn test_like_passes_pattern_through() {
        let frag = PredicateCompiler::compile(&schema(), &member("String1").like("A%")).unwrap();
        assert_eq!(frag.params, vec![IndexValue::Text("A%".into())]);
    }

    #[test]
    fn test_unsupported_operator_fails() {
        let expr = Expr::Binary {
            left: Box::new(Expr::Member("Int1".into())),
            op: BinaryOp::Add,
            right: Box::new(Expr::Literal(IndexValue::Integer(1))),
        };
        let err = PredicateCompiler::compile(&schema(), &expr).unwrap_err();
        assert!(err.to_string().contains("unsupported operator"));
    }

    #[test]
    fn test_binary_member_fails_compilation() {
        let err =
            PredicateCompiler::compile(&schema(), &member("Blob1").eq("x")).unwrap_err();
        assert!(err.to_string().contains("binary member unsupported"));
    }

    #[test]
    fn test_string_operator_on_non_text_member_fails() {
        let err =
            PredicateCompiler::compile(&schema(), &member("Int1").contains("4")).unwrap_err();
        assert!(matches!(err, StoreError::Compile(_)));
    }

    #[test]
    fn test_id_predicate_uses_fixed_column() {
        let id = uuid::Uuid::new_v4();
        let frag = PredicateCompiler::compile(&schema(), &member("Id").eq(id)).unwrap();
        assert_eq!(frag.sql, "si.[Id] = @p0");
    }
}
