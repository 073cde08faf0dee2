use serde_json::Value;
use tracing::{debug, warn};

use super::PreferenceStore;
use crate::{errors::Result, goals::SavingsGoal};

pub const GOALS_KEY: &str = "vaultrise_goals";
pub const ONBOARDING_KEY: &str = "vaultrise_onboarding_completed";

/// Everything the adapter restores on launch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredState {
    pub goals: Vec<SavingsGoal>,
    pub onboarding_done: bool,
}

/// Persists the goal list and the onboarding flag as two preference entries.
///
/// Reads degrade to defaults and writes never surface errors; both outcomes are
/// logged instead.
pub struct GoalStore {
    store: Box<dyn PreferenceStore>,
}

impl GoalStore {
    pub fn new(store: Box<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn load(&self) -> StoredState {
        StoredState {
            goals: self.load_goals(),
            onboarding_done: self.load_onboarding(),
        }
    }

    fn load_goals(&self) -> Vec<SavingsGoal> {
        let raw = match self.store.get(GOALS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("could not read stored goals: {}", err);
                return Vec::new();
            }
        };
        match serde_json::from_value::<Vec<SavingsGoal>>(raw) {
            Ok(goals) => {
                debug!("loaded {} goal(s)", goals.len());
                goals
            }
            Err(err) => {
                warn!("stored goals could not be decoded, starting empty: {}", err);
                Vec::new()
            }
        }
    }

    fn load_onboarding(&self) -> bool {
        match self.store.get(ONBOARDING_KEY) {
            Ok(Some(Value::Bool(done))) => done,
            Ok(_) => false,
            Err(err) => {
                warn!("could not read onboarding flag: {}", err);
                false
            }
        }
    }

    /// Overwrites the stored goal list, logging and dropping any failure.
    pub fn save(&mut self, goals: &[SavingsGoal]) {
        if let Err(err) = self.try_save(goals) {
            warn!("failed to save {} goal(s): {}", goals.len(), err);
        }
    }

    /// Overwrites the stored goal list, reporting failures to the caller.
    pub fn try_save(&mut self, goals: &[SavingsGoal]) -> Result<()> {
        let encoded = serde_json::to_value(goals)?;
        self.store.set(GOALS_KEY, encoded)?;
        debug!("saved {} goal(s)", goals.len());
        Ok(())
    }

    pub fn set_onboarding_complete(&mut self) {
        if let Err(err) = self.store.set(ONBOARDING_KEY, Value::Bool(true)) {
            warn!("failed to record onboarding completion: {}", err);
        }
    }

    /// Stores an empty goal list. The onboarding flag is left alone.
    pub fn reset_all(&mut self) {
        self.save(&[]);
    }
}
