//! Settings source abstraction
//!
//! The layer never loads settings files itself; it reads opaque blobs
//! through this trait and leaves storage of them to the embedding
//! application.

use serde_json::Value;

/// Read-only settings lookup by top-level key.
pub trait SettingsSource: Send + Sync {
    /// The settings blob stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;
}

/// Settings backed by an in-memory JSON object.
#[derive(Debug, Clone, Default)]
pub struct StaticSettings {
    values: serde_json::Map<String, Value>,
}

impl StaticSettings {
    /// Build from a JSON object. Anything else yields empty settings.
    pub fn new(values: Value) -> Self {
        let values = match values {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self { values }
    }
}

impl SettingsSource for StaticSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

/// A source with no settings at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSettings;

impl SettingsSource for NullSettings {
    fn get(&self, _key: &str) -> Option<Value> {
        None
    }
}
