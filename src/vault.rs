//! Owned state container for the goal list.
//!
//! Every mutation saves the full list through the [`GoalStore`] before
//! subscribers are notified, so observers always see persisted state.

use std::fmt;

use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    errors::{Result, VaultError},
    goals::{SavingsGoal, Transaction},
    storage::{GoalStore, PreferenceStore},
    summary::{self, VaultSummary},
    time::Clock,
};

/// Describes the mutation that produced the current state.
#[derive(Debug, Clone, PartialEq)]
pub enum VaultEvent {
    GoalAdded(Uuid),
    GoalUpdated(Uuid),
    GoalDeleted(Uuid),
    TransactionAdded {
        goal_id: Uuid,
        transaction_id: Uuid,
        newly_completed: bool,
    },
    Reset,
    OnboardingCompleted,
}

/// Result of recording a transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransactionOutcome {
    pub goal_id: Uuid,
    pub newly_completed: bool,
    pub current_amount: f64,
}

/// Cloned view of the container's state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultSnapshot {
    pub goals: Vec<SavingsGoal>,
    pub onboarding_done: bool,
    pub summary: VaultSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&VaultEvent)>;

pub struct VaultManager {
    goals: Vec<SavingsGoal>,
    onboarding_done: bool,
    store: GoalStore,
    clock: Box<dyn Clock>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for VaultManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultManager")
            .field("goals", &self.goals.len())
            .field("onboarding_done", &self.onboarding_done)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl VaultManager {
    /// Loads persisted state from `store`; unreadable data starts empty.
    pub fn open(store: Box<dyn PreferenceStore>, clock: Box<dyn Clock>) -> Self {
        let store = GoalStore::new(store);
        let state = store.load();
        info!(
            "vault opened with {} goal(s), onboarding complete: {}",
            state.goals.len(),
            state.onboarding_done
        );
        Self {
            goals: state.goals,
            onboarding_done: state.onboarding_done,
            store,
            clock,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn goals(&self) -> &[SavingsGoal] {
        &self.goals
    }

    pub fn goal(&self, id: Uuid) -> Option<&SavingsGoal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.onboarding_done
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn summary(&self) -> VaultSummary {
        summary::summarize(&self.goals, self.clock.now())
    }

    pub fn snapshot(&self) -> VaultSnapshot {
        VaultSnapshot {
            goals: self.goals.clone(),
            onboarding_done: self.onboarding_done,
            summary: self.summary(),
        }
    }

    pub fn add_goal(&mut self, goal: SavingsGoal) -> Uuid {
        let id = goal.id;
        info!("adding goal `{}` ({})", goal.name, id);
        self.goals.push(goal);
        self.commit(VaultEvent::GoalAdded(id));
        id
    }

    /// Replaces the goal sharing `goal.id`.
    pub fn update_goal(&mut self, goal: SavingsGoal) -> Result<()> {
        let id = goal.id;
        let slot = self
            .goals
            .iter_mut()
            .find(|existing| existing.id == id)
            .ok_or_else(|| VaultError::GoalNotFound(id.to_string()))?;
        *slot = goal;
        debug!("updated goal {}", id);
        self.commit(VaultEvent::GoalUpdated(id));
        Ok(())
    }

    /// Removes the goal and, with it, its transactions.
    pub fn delete_goal(&mut self, id: Uuid) -> Result<SavingsGoal> {
        let index = self
            .goals
            .iter()
            .position(|goal| goal.id == id)
            .ok_or_else(|| VaultError::GoalNotFound(id.to_string()))?;
        let removed = self.goals.remove(index);
        info!(
            "deleted goal `{}` with {} transaction(s)",
            removed.name,
            removed.transactions.len()
        );
        self.commit(VaultEvent::GoalDeleted(id));
        Ok(removed)
    }

    pub fn add_transaction(
        &mut self,
        goal_id: Uuid,
        transaction: Transaction,
    ) -> Result<TransactionOutcome> {
        let goal = self
            .goals
            .iter_mut()
            .find(|goal| goal.id == goal_id)
            .ok_or_else(|| VaultError::GoalNotFound(goal_id.to_string()))?;
        let transaction_id = transaction.id;
        let newly_completed = goal.add_transaction(transaction);
        let outcome = TransactionOutcome {
            goal_id,
            newly_completed,
            current_amount: goal.current_amount,
        };
        if newly_completed {
            info!("goal `{}` reached its target", goal.name);
        }
        self.commit(VaultEvent::TransactionAdded {
            goal_id,
            transaction_id,
            newly_completed,
        });
        Ok(outcome)
    }

    /// Drops every goal. The onboarding flag survives.
    pub fn reset_all(&mut self) {
        info!("resetting vault, dropping {} goal(s)", self.goals.len());
        self.goals.clear();
        self.store.reset_all();
        self.notify(&VaultEvent::Reset);
    }

    pub fn complete_onboarding(&mut self) {
        self.onboarding_done = true;
        self.store.set_onboarding_complete();
        self.notify(&VaultEvent::OnboardingCompleted);
    }

    /// Saves the current list, surfacing any storage failure.
    pub fn flush(&mut self) -> Result<()> {
        self.store.try_save(&self.goals)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&VaultEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn commit(&mut self, event: VaultEvent) {
        self.store.save(&self.goals);
        self.notify(&event);
    }

    fn notify(&mut self, event: &VaultEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}
