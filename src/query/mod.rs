pub mod assemble;
pub mod ast;
pub mod fragment;
pub mod include;
pub mod predicate;
pub mod sort;
pub mod translate;

pub use assemble::{QueryAssembler, QueryDef};
pub use ast::{
    BinaryOp, Expr, IncludeExpr, MemberRef, SortDirection, SortExpr, StringOp, asc, desc, member,
    not,
};
pub use fragment::SqlFragment;
pub use include::IncludeCompiler;
pub use predicate::PredicateCompiler;
pub use sort::SortCompiler;
pub use translate::translate_path;
