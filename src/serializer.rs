//! Pluggable serialization seam.
//!
//! The engine works on `serde_json::Value` trees internally; the
//! serializer only decides how trees become body text and back. The
//! default implementation is plain `serde_json`.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::core::Result;

pub trait Serializer: Send + Sync {
    fn serialize_value(&self, value: &JsonValue) -> Result<String>;
    fn deserialize_text(&self, json: &str) -> Result<JsonValue>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize_value(&self, value: &JsonValue) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize_text(&self, json: &str) -> Result<JsonValue> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn to_tree<T: Serialize>(item: &T) -> Result<JsonValue> {
    Ok(serde_json::to_value(item)?)
}

pub fn from_tree<T: DeserializeOwned>(tree: JsonValue) -> Result<T> {
    Ok(serde_json::from_value(tree)?)
}
