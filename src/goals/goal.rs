use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::Transaction;

/// A named savings target with its running balance and transaction history.
///
/// The model performs no validation; see [`crate::forms`] for the rules callers
/// apply before constructing or mutating a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    pub id: Uuid,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub is_completed: bool,
}

impl SavingsGoal {
    /// Creates an empty goal starting now.
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            target_amount,
            current_amount: 0.0,
            start_date: Utc::now(),
            deadline: None,
            transactions: Vec::new(),
            is_completed: false,
        }
    }

    /// Seeds the balance. Does not mark the goal completed even when the seed
    /// already covers the target; completion is only evaluated on transactions.
    pub fn with_current_amount(mut self, amount: f64) -> Self {
        self.current_amount = amount;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_start_date(mut self, start_date: DateTime<Utc>) -> Self {
        self.start_date = start_date;
        self
    }

    /// Appends `transaction`, applies its signed amount, and re-evaluates
    /// completion. Returns `true` when this call completed the goal.
    pub fn add_transaction(&mut self, transaction: Transaction) -> bool {
        self.current_amount += transaction.amount;
        self.transactions.push(transaction);
        let was_completed = self.is_completed;
        self.is_completed = was_completed || self.current_amount >= self.target_amount;
        self.is_completed && !was_completed
    }

    /// Fraction of the target reached, clamped to `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.target_amount > 0.0 {
            (self.current_amount / self.target_amount).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn progress_percentage(&self) -> u8 {
        (self.progress() * 100.0).floor() as u8
    }

    pub fn remaining_amount(&self) -> f64 {
        (self.target_amount - self.current_amount).max(0.0)
    }

    /// Whole days until the deadline; negative once it has passed.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.deadline.map(|deadline| (deadline - now).num_days())
    }

    /// Transactions ordered newest first.
    pub fn recent_transactions(&self) -> Vec<&Transaction> {
        let mut sorted: Vec<&Transaction> = self.transactions.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    pub fn find_transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }
}
