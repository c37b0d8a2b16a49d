use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::core::{Result, StoreError};

/// A comparable value extracted from a structure by an index accessor.
///
/// This is the unit that flows into index columns, unique rows and SQL
/// parameters. `Bytes` values can be stored but never compared in a
/// predicate (no safe literal representation).
#[derive(Debug, Clone)]
pub enum IndexValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Guid(Uuid),
    Bytes(Vec<u8>),
}

impl IndexValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Boolean(_) => "BOOLEAN",
            Self::Timestamp(_) => "TIMESTAMP",
            Self::Guid(_) => "GUID",
            Self::Bytes(_) => "BYTES",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Canonical text form, used as the `UqValue` of unique rows so that
    /// equal values always collide regardless of their kind.
    pub fn canonical_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::Boolean(b) => b.to_string(),
            Self::Timestamp(ts) => ts.to_rfc3339(),
            Self::Guid(u) => u.hyphenated().to_string(),
            Self::Bytes(b) => b.iter().map(|byte| format!("{:02x}", byte)).collect(),
        }
    }

    /// Convert a JSON node into a value of the expected kind.
    pub fn from_json(node: &JsonValue, kind: DataKind) -> Result<Self> {
        match (node, kind) {
            (JsonValue::Null, _) => Ok(Self::Null),

            (JsonValue::Bool(b), DataKind::Boolean) => Ok(Self::Boolean(*b)),

            (JsonValue::Number(n), DataKind::Integer) => n
                .as_i64()
                .map(Self::Integer)
                .ok_or_else(|| conversion_error(node, kind)),

            // Float accepts integers too
            (JsonValue::Number(n), DataKind::Float | DataKind::Decimal) => n
                .as_f64()
                .map(Self::Float)
                .ok_or_else(|| conversion_error(node, kind)),

            (JsonValue::String(s), DataKind::Text | DataKind::Enum) => Ok(Self::Text(s.clone())),

            (JsonValue::String(s), DataKind::Timestamp) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Self::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| conversion_error(node, kind)),

            (JsonValue::String(s), DataKind::Guid) => Uuid::parse_str(s)
                .map(Self::Guid)
                .map_err(|_| conversion_error(node, kind)),

            // serde serializes Vec<u8> as an array of numbers
            (JsonValue::Array(items), DataKind::Bytes) => items
                .iter()
                .map(|item| {
                    item.as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| conversion_error(node, kind))
                })
                .collect::<Result<Vec<u8>>>()
                .map(Self::Bytes),

            _ => Err(conversion_error(node, kind)),
        }
    }
}

fn conversion_error(node: &JsonValue, kind: DataKind) -> StoreError {
    StoreError::Serialization(format!("cannot convert JSON {} to {}", node, kind))
}

impl PartialEq for IndexValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                (a - b).abs() < f64::EPSILON
            }
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                (*i as f64 - f).abs() < f64::EPSILON
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Guid(a), Self::Guid(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialOrd for IndexValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Null, _) => Some(Ordering::Less),
            (_, Self::Null) => Some(Ordering::Greater),
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Integer(i), Self::Float(f)) => (*i as f64).partial_cmp(f),
            (Self::Float(f), Self::Integer(i)) => f.partial_cmp(&(*i as f64)),
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            (Self::Guid(a), Self::Guid(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bytes(b) => write!(f, "0x{}", Self::Bytes(b.clone()).canonical_text()),
            other => write!(f, "{}", other.canonical_text()),
        }
    }
}

impl From<i32> for IndexValue {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for IndexValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for IndexValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for IndexValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for IndexValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for IndexValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Uuid> for IndexValue {
    fn from(u: Uuid) -> Self {
        Self::Guid(u)
    }
}

impl From<DateTime<Utc>> for IndexValue {
    fn from(ts: DateTime<Utc>) -> Self {
        Self::Timestamp(ts)
    }
}

impl<T: Into<IndexValue>> From<Option<T>> for IndexValue {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

/// The declared kind of an indexable member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Integer,
    Float,
    Decimal,
    Text,
    Boolean,
    Timestamp,
    Guid,
    Enum,
    Bytes,
}

impl DataKind {
    /// Whether a predicate may compare members of this kind.
    pub fn is_comparable(&self) -> bool {
        !matches!(self, Self::Bytes)
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Enum)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Decimal => write!(f, "DECIMAL"),
            Self::Text => write!(f, "TEXT"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Guid => write!(f, "GUID"),
            Self::Enum => write!(f, "ENUM"),
            Self::Bytes => write!(f, "BYTES"),
        }
    }
}
