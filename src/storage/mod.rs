//! Preference-style key-value persistence and the goal adapter built on it.

pub mod goal_store;
pub mod json_file;
pub mod memory;

use serde_json::Value;

use crate::errors::Result;

pub use goal_store::{GoalStore, StoredState, GOALS_KEY, ONBOARDING_KEY};
pub use json_file::JsonFilePreferences;
pub use memory::MemoryPreferences;

/// Abstraction over a local preferences store holding JSON values by key.
///
/// Single-process, single-writer access is assumed; implementations do not
/// coordinate concurrent writers.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
