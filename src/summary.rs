//! Aggregate statistics derived from the full goal list on demand.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::goals::SavingsGoal;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Point-in-time totals across every goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSummary {
    pub total_saved: f64,
    pub completed_count: usize,
    pub active_count: usize,
    pub average_daily_rate: f64,
}

pub fn summarize(goals: &[SavingsGoal], now: DateTime<Utc>) -> VaultSummary {
    VaultSummary {
        total_saved: total_saved(goals),
        completed_count: completed_count(goals),
        active_count: active_count(goals),
        average_daily_rate: average_daily_rate(goals, now),
    }
}

pub fn total_saved(goals: &[SavingsGoal]) -> f64 {
    goals.iter().map(|goal| goal.current_amount).sum()
}

pub fn completed_count(goals: &[SavingsGoal]) -> usize {
    goals.iter().filter(|goal| goal.is_completed).count()
}

pub fn active_count(goals: &[SavingsGoal]) -> usize {
    goals.iter().filter(|goal| !goal.is_completed).count()
}

/// Total saved divided by the summed age of all goals in days, where each goal
/// counts for at least one day.
pub fn average_daily_rate(goals: &[SavingsGoal], now: DateTime<Utc>) -> f64 {
    if goals.is_empty() {
        return 0.0;
    }
    let total_days: f64 = goals
        .iter()
        .map(|goal| days_since(goal.start_date, now).max(1.0))
        .sum();
    total_saved(goals) / total_days
}

fn days_since(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - start).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}
