//! Process-wide schema cache.
//!
//! Instance-scoped on purpose: the cache lives with the store (or a
//! test), never as a global, so isolated registries are cheap to create.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::core::Result;
use crate::schema::builder::SchemaBuilder;
use crate::schema::reflect::TypeReflector;
use crate::schema::schema::StructureSchema;
use crate::schema::type_def::{Storable, TypeDef};

#[derive(Default)]
pub struct SchemaCache {
    inner: Mutex<HashMap<String, Arc<StructureSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached schema for the definition's type, building it on
    /// first reference. Builds for the same type are serialized by the
    /// cache lock; different callers then share one `Arc`.
    pub fn get_or_build(&self, def: &TypeDef) -> Result<Arc<StructureSchema>> {
        let mut map = self.inner.lock()?;
        if let Some(existing) = map.get(&def.name) {
            return Ok(Arc::clone(existing));
        }

        let structure_type = TypeReflector::reflect(def)?;
        let schema = Arc::new(SchemaBuilder::build(&structure_type)?);
        map.insert(def.name.clone(), Arc::clone(&schema));
        debug!(type_name = %def.name, "built and cached structure schema");
        Ok(schema)
    }

    pub fn get_or_build_for<T: Storable>(&self) -> Result<Arc<StructureSchema>> {
        self.get_or_build(&T::type_def())
    }

    pub fn get(&self, type_name: &str) -> Result<Option<Arc<StructureSchema>>> {
        Ok(self.inner.lock()?.get(type_name).cloned())
    }

    /// Invalidate one type, e.g. after a structural migration. The next
    /// reference rebuilds from the type definition.
    pub fn remove(&self, type_name: &str) -> Result<bool> {
        Ok(self.inner.lock()?.remove(type_name).is_some())
    }

    pub fn clear(&self) -> Result<()> {
        self.inner.lock()?.clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
