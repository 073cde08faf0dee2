use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the vault, its storage backends, and the CLI.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Goal not found: {0}")]
    GoalNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, VaultError>;

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        VaultError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Storage(err.to_string())
    }
}
