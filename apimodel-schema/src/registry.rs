//! Schema registry for lookup by name.

use crate::schema::Schema;
use apimodel_core::SchemaError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of built schemas keyed by name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Register a schema under its name.
    ///
    /// Registering the same schema twice is a no-op; a different schema
    /// with an already registered name is rejected.
    pub fn register(&self, schema: &Arc<Schema>) -> Result<(), SchemaError> {
        let mut schemas = self.schemas.write();
        if let Some(existing) = schemas.get(schema.name()) {
            if Arc::ptr_eq(existing, schema) {
                return Ok(());
            }
            warn!(schema = %schema.name(), "Schema name already registered");
            return Err(SchemaError::DuplicateSchema(schema.name().to_string()));
        }
        debug!(schema = %schema.name(), "Registered schema");
        schemas.insert(schema.name().to_string(), Arc::clone(schema));
        Ok(())
    }

    /// Get a schema by name.
    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.read().get(name).cloned()
    }

    /// Check if a schema exists.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    /// Remove a schema.
    pub fn remove(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.write().remove(name)
    }
}

static GLOBAL_REGISTRY: std::sync::OnceLock<SchemaRegistry> = std::sync::OnceLock::new();

/// Get the process-wide schema registry.
pub fn global_registry() -> &'static SchemaRegistry {
    GLOBAL_REGISTRY.get_or_init(SchemaRegistry::new)
}
