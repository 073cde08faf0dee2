//! Savings goal domain models and their transaction ledger.

pub mod goal;
pub mod transaction;

pub use goal::SavingsGoal;
pub use transaction::{Transaction, TransactionKind};
