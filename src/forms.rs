//! Caller-side validation for goal and transaction input.
//!
//! The model accepts any values; these drafts are what a front end fills in and
//! checks before it creates a goal or records a transaction.

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
    errors::{Result, VaultError},
    goals::{SavingsGoal, Transaction, TransactionKind},
};

const MAX_NOTE_LEN: usize = 200;

/// Unvalidated input for a new goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDraft {
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<DateTime<Utc>>,
}

impl GoalDraft {
    pub fn new(name: impl Into<String>, target_amount: f64) -> Self {
        Self {
            name: name.into(),
            target_amount,
            current_amount: 0.0,
            deadline: None,
        }
    }

    pub fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(invalid("Name is required"));
        }
        if !self.target_amount.is_finite() || self.target_amount <= 0.0 {
            return Err(invalid("Target amount must be greater than zero"));
        }
        if !self.current_amount.is_finite() || self.current_amount < 0.0 {
            return Err(invalid("Starting amount must be zero or positive"));
        }
        if let Some(deadline) = self.deadline {
            if deadline <= now {
                return Err(invalid(format!(
                    "Deadline must be after {}",
                    now.format("%Y-%m-%d")
                )));
            }
        }
        Ok(())
    }

    /// Validates and builds the goal, starting it at `now`.
    pub fn into_goal(self, now: DateTime<Utc>) -> Result<SavingsGoal> {
        self.validate(now)?;
        Ok(SavingsGoal::new(self.name.trim(), self.target_amount)
            .with_current_amount(self.current_amount)
            .with_deadline(self.deadline)
            .with_start_date(now))
    }
}

/// Unvalidated deposit or withdrawal of an unsigned amount.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub amount: f64,
    pub note: Option<String>,
}

impl TransactionDraft {
    pub fn new(kind: TransactionKind, amount: f64) -> Self {
        Self {
            kind,
            amount,
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.note = note.and_then(sanitize_note);
        self
    }

    pub fn validate(&self, goal: &SavingsGoal) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(invalid("Amount must be greater than zero"));
        }
        if self.kind == TransactionKind::Withdrawal && self.amount > goal.current_amount {
            return Err(invalid(format!(
                "Cannot withdraw {:.2}; only {:.2} saved in `{}`",
                self.amount, goal.current_amount, goal.name
            )));
        }
        if let Some(note) = &self.note {
            if note.chars().count() > MAX_NOTE_LEN {
                return Err(invalid(format!(
                    "Notes cannot exceed {} characters",
                    MAX_NOTE_LEN
                )));
            }
        }
        Ok(())
    }

    /// Validates against `goal` and builds the signed transaction dated `now`.
    pub fn into_transaction(self, goal: &SavingsGoal, now: DateTime<Utc>) -> Result<Transaction> {
        self.validate(goal)?;
        let mut transaction =
            Transaction::new(self.amount * self.kind.sign(), self.kind).with_date(now);
        transaction.note = self.note;
        Ok(transaction)
    }
}

/// Parses user text such as `1,250.50` or `$40` into a positive amount.
pub fn parse_amount(input: &str) -> Result<f64> {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ',' | '$' | '_'))
        .collect();
    if cleaned.is_empty() {
        return Err(invalid("Amount is required"));
    }
    let value = cleaned
        .parse::<f64>()
        .map_err(|_| invalid(format!("Enter a numeric amount (got `{}`)", input.trim())))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("Amount must be greater than zero"));
    }
    Ok(value)
}

/// Parses a `YYYY-MM-DD` deadline into midnight UTC of that day.
pub fn parse_deadline(input: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| invalid("Use YYYY-MM-DD format"))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| invalid("Deadline is out of range"))?;
    Ok(midnight.and_utc())
}

fn sanitize_note(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn invalid(message: impl Into<String>) -> VaultError {
    VaultError::InvalidInput(message.into())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 8, 30, 0).unwrap()
    }

    #[test]
    fn goal_draft_requires_name_and_positive_target() {
        assert!(GoalDraft::new("   ", 100.0).validate(now()).is_err());
        assert!(GoalDraft::new("Car", 0.0).validate(now()).is_err());
        assert!(GoalDraft::new("Car", -5.0).validate(now()).is_err());
        assert!(GoalDraft::new("Car", f64::NAN).validate(now()).is_err());
        assert!(GoalDraft::new("Car", 100.0).validate(now()).is_ok());
    }

    #[test]
    fn goal_draft_rejects_past_deadline() {
        let mut draft = GoalDraft::new("Car", 100.0);
        draft.deadline = Some(now() - Duration::days(1));
        assert!(draft.validate(now()).is_err());
        draft.deadline = Some(now() + Duration::days(1));
        assert!(draft.validate(now()).is_ok());
    }

    #[test]
    fn into_goal_trims_name_and_seeds_balance() {
        let mut draft = GoalDraft::new("  Emergency fund ", 5000.0);
        draft.current_amount = 750.0;
        let goal = draft.into_goal(now()).unwrap();
        assert_eq!(goal.name, "Emergency fund");
        assert_eq!(goal.current_amount, 750.0);
        assert_eq!(goal.start_date, now());
        assert!(!goal.is_completed);
    }

    #[test]
    fn withdrawal_cannot_exceed_balance() {
        let goal = SavingsGoal::new("Trip", 500.0).with_current_amount(120.0);
        let too_much = TransactionDraft::new(TransactionKind::Withdrawal, 120.01);
        assert!(too_much.validate(&goal).is_err());
        let exact = TransactionDraft::new(TransactionKind::Withdrawal, 120.0);
        let txn = exact.into_transaction(&goal, now()).unwrap();
        assert_eq!(txn.amount, -120.0);
        assert_eq!(txn.date, now());
    }

    #[test]
    fn deposit_needs_positive_amount() {
        let goal = SavingsGoal::new("Trip", 500.0);
        assert!(TransactionDraft::new(TransactionKind::Deposit, 0.0).validate(&goal).is_err());
        let txn = TransactionDraft::new(TransactionKind::Deposit, 80.0)
            .with_note(Some("  birthday  "))
            .into_transaction(&goal, now())
            .unwrap();
        assert_eq!(txn.amount, 80.0);
        assert_eq!(txn.note.as_deref(), Some("birthday"));
    }

    #[test]
    fn blank_notes_are_dropped_and_long_ones_rejected() {
        let goal = SavingsGoal::new("Trip", 500.0);
        let blank = TransactionDraft::new(TransactionKind::Deposit, 1.0).with_note(Some("   "));
        assert_eq!(blank.note, None);
        let long = "x".repeat(MAX_NOTE_LEN + 1);
        let draft = TransactionDraft::new(TransactionKind::Deposit, 1.0).with_note(Some(&long));
        assert!(draft.validate(&goal).is_err());
    }

    #[test]
    fn parse_amount_accepts_currency_text() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert_eq!(parse_amount(" $40 ").unwrap(), 40.0);
        assert!(parse_amount("").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("-3").is_err());
        assert!(parse_amount("inf").is_err());
    }

    #[test]
    fn parse_deadline_reads_iso_dates() {
        let deadline = parse_deadline("2025-12-31").unwrap();
        assert_eq!(deadline, Utc.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap());
        assert!(parse_deadline("31/12/2025").is_err());
    }
}
