//! Expression node model and the fluent builders that construct it.
//!
//! The compilers operate purely on these nodes; how a caller produced
//! them (the DSL here, or hand-built trees) is irrelevant to
//! compilation.

use std::fmt;

use crate::core::IndexValue;

/// Binary operators. Arithmetic variants exist in the node model but
/// have no SQL mapping and fail compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    /// SQL rendering of the operator, `None` when unmapped.
    pub fn sql(&self) -> Option<&'static str> {
        match self {
            Self::Eq => Some("="),
            Self::NotEq => Some("<>"),
            Self::Lt => Some("<"),
            Self::LtEq => Some("<="),
            Self::Gt => Some(">"),
            Self::GtEq => Some(">="),
            Self::And => Some("and"),
            Self::Or => Some("or"),
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo => None,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "and",
            Self::Or => "or",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringOp {
    StartsWith,
    EndsWith,
    Contains,
    Like,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Member path reference, e.g. `Nested.Value`.
    Member(String),

    /// Literal value; null literals render as `is null` checks.
    Literal(IndexValue),

    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    StringMatch {
        member: String,
        op: StringOp,
        pattern: String,
    },

    IsNull {
        member: String,
        negated: bool,
    },

    Not(Box<Expr>),
}

impl Expr {
    pub fn and(self, other: Expr) -> Expr {
        Expr::Binary { left: Box::new(self), op: BinaryOp::And, right: Box::new(other) }
    }

    pub fn or(self, other: Expr) -> Expr {
        Expr::Binary { left: Box::new(self), op: BinaryOp::Or, right: Box::new(other) }
    }
}

pub fn not(expr: Expr) -> Expr {
    Expr::Not(Box::new(expr))
}

/// Entry point of the expression DSL: `member("Int1").eq(42)`.
pub fn member(path: impl Into<String>) -> MemberRef {
    MemberRef { path: path.into() }
}

#[derive(Debug, Clone)]
pub struct MemberRef {
    path: String,
}

impl MemberRef {
    fn compare(self, op: BinaryOp, value: impl Into<IndexValue>) -> Expr {
        Expr::Binary {
            left: Box::new(Expr::Member(self.path)),
            op,
            right: Box::new(Expr::Literal(value.into())),
        }
    }

    pub fn eq(self, value: impl Into<IndexValue>) -> Expr {
        self.compare(BinaryOp::Eq, value)
    }

    pub fn not_eq(self, value: impl Into<IndexValue>) -> Expr {
        self.compare(BinaryOp::NotEq, value)
    }

    pub fn lt(self, value: impl Into<IndexValue>) -> Expr {
        self.compare(BinaryOp::Lt, value)
    }

    pub fn lt_eq(self, value: impl Into<IndexValue>) -> Expr {
        self.compare(BinaryOp::LtEq, value)
    }

    pub fn gt(self, value: impl Into<IndexValue>) -> Expr {
        self.compare(BinaryOp::Gt, value)
    }

    pub fn gt_eq(self, value: impl Into<IndexValue>) -> Expr {
        self.compare(BinaryOp::GtEq, value)
    }

    fn string_match(self, op: StringOp, pattern: impl Into<String>) -> Expr {
        Expr::StringMatch { member: self.path, op, pattern: pattern.into() }
    }

    pub fn starts_with(self, pattern: impl Into<String>) -> Expr {
        self.string_match(StringOp::StartsWith, pattern)
    }

    pub fn ends_with(self, pattern: impl Into<String>) -> Expr {
        self.string_match(StringOp::EndsWith, pattern)
    }

    pub fn contains(self, pattern: impl Into<String>) -> Expr {
        self.string_match(StringOp::Contains, pattern)
    }

    /// Raw LIKE pattern; wildcards are the caller's responsibility.
    pub fn like(self, pattern: impl Into<String>) -> Expr {
        self.string_match(StringOp::Like, pattern)
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull { member: self.path, negated: false }
    }

    pub fn is_not_null(self) -> Expr {
        Expr::IsNull { member: self.path, negated: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortExpr {
    pub path: String,
    pub direction: SortDirection,
}

pub fn asc(path: impl Into<String>) -> SortExpr {
    SortExpr { path: path.into(), direction: SortDirection::Asc }
}

pub fn desc(path: impl Into<String>) -> SortExpr {
    SortExpr { path: path.into(), direction: SortDirection::Desc }
}

/// Eager-include of a referenced type's body, identified by an id-valued
/// member path.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeExpr {
    pub path: String,
    pub referenced_type: String,
}

impl IncludeExpr {
    pub fn new(path: impl Into<String>, referenced_type: impl Into<String>) -> Self {
        Self { path: path.into(), referenced_type: referenced_type.into() }
    }

    /// Projection alias: the path with its trailing id suffix stripped,
    /// e.g. `DeliveryAddressId` -> `DeliveryAddress`.
    pub fn alias(&self) -> String {
        if let Some(stripped) = self.path.strip_suffix(".StructureId") {
            return stripped.to_string();
        }
        match self.path.strip_suffix("Id") {
            Some(stripped) if !stripped.is_empty() => stripped.trim_end_matches('.').to_string(),
            _ => self.path.clone(),
        }
    }
}
