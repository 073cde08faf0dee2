use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a balance adjustment recorded against a goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

impl TransactionKind {
    pub fn sign(self) -> f64 {
        match self {
            TransactionKind::Deposit => 1.0,
            TransactionKind::Withdrawal => -1.0,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        };
        f.write_str(label)
    }
}

/// A signed balance adjustment. Deposits carry positive amounts and withdrawals
/// negative ones by convention; nothing here enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: f64,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Transaction {
    /// Records `amount` exactly as given, dated now.
    pub fn new(amount: f64, kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            date: Utc::now(),
            kind,
            note: None,
        }
    }

    /// Deposit of `value`, stored as a positive amount.
    pub fn deposit(value: f64) -> Self {
        Self::new(value.abs(), TransactionKind::Deposit)
    }

    /// Withdrawal of `value`, stored as a negative amount.
    pub fn withdrawal(value: f64) -> Self {
        Self::new(-value.abs(), TransactionKind::Withdrawal)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    pub fn signed_label(&self) -> &'static str {
        match self.kind {
            TransactionKind::Deposit => "+",
            TransactionKind::Withdrawal => "-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_apply_sign_convention() {
        assert_eq!(Transaction::deposit(25.0).amount, 25.0);
        assert_eq!(Transaction::withdrawal(25.0).amount, -25.0);
        assert_eq!(Transaction::withdrawal(-25.0).amount, -25.0);
        assert_eq!(Transaction::withdrawal(40.0).magnitude(), 40.0);
    }

    #[test]
    fn new_keeps_amount_untouched() {
        let txn = Transaction::new(-12.5, TransactionKind::Deposit);
        assert_eq!(txn.amount, -12.5);
        assert_eq!(txn.signed_label(), "+");
    }

    #[test]
    fn kind_serializes_lowercase_under_type_key() {
        let txn = Transaction::withdrawal(10.0).with_note("rent");
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "withdrawal");
        assert_eq!(json["note"], "rent");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn missing_note_is_omitted_and_defaults_on_read() {
        let txn = Transaction::deposit(5.0);
        let json = serde_json::to_string(&txn).unwrap();
        assert!(!json.contains("note"));
        let back: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, txn);
    }
}
