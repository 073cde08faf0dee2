use std::collections::HashMap;

use serde_json::Value;

use super::PreferenceStore;
use crate::errors::Result;

/// In-memory preference store; contents vanish with the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    entries: HashMap<String, Value>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
