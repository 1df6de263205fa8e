//! Storage error type shared by all repositories.

use thiserror::Error;

/// Errors surfaced by a repository implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A uniqueness or concurrency conflict.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The backend itself failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl From<StoreError> for kasbook_shared::error::AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) => Self::NotFound(err.to_string()),
            StoreError::Conflict(_) => Self::Conflict(err.to_string()),
            StoreError::Backend(_) => Self::Storage(err.to_string()),
        }
    }
}

impl From<StoreError> for kasbook_core::ledger::LedgerError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<StoreError> for kasbook_core::inventory::InventoryError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<StoreError> for kasbook_core::closing::ClosingError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<StoreError> for kasbook_core::documents::DocumentError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}
