//! Closing error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use kasbook_shared::types::ClosingId;

use super::types::ClosingStatus;

/// Errors that can occur during closing operations.
#[derive(Debug, Error)]
pub enum ClosingError {
    /// The resolved period is empty or inverted.
    #[error("Invalid period: start {start} is not before end {end}")]
    InvalidPeriod {
        /// Resolved period start.
        start: DateTime<Utc>,
        /// Resolved period end.
        end: DateTime<Utc>,
    },

    /// A closing already covers this period.
    #[error("A closing already exists for this period")]
    PeriodAlreadyClosed,

    /// Closing not found.
    #[error("Closing not found: {0}")]
    NotFound(ClosingId),

    /// Status transitions are one-way.
    #[error("Cannot transition closing from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current status.
        from: ClosingStatus,
        /// Requested status.
        to: ClosingStatus,
    },

    /// The cutoff hour must be 0-23.
    #[error("Cutoff hour {0} is out of range (0-23)")]
    InvalidCutoffHour(u32),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClosingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPeriod { .. } => "INVALID_PERIOD",
            Self::PeriodAlreadyClosed => "PERIOD_ALREADY_CLOSED",
            Self::NotFound(_) => "CLOSING_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::InvalidCutoffHour(_) => "INVALID_CUTOFF_HOUR",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidPeriod { .. } | Self::InvalidCutoffHour(_) => 400,
            Self::PeriodAlreadyClosed | Self::InvalidTransition { .. } => 409,
            Self::NotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }
}

impl From<ClosingError> for kasbook_shared::error::AppError {
    fn from(err: ClosingError) -> Self {
        match &err {
            ClosingError::NotFound(_) => Self::NotFound(err.to_string()),
            ClosingError::PeriodAlreadyClosed | ClosingError::InvalidTransition { .. } => {
                Self::Conflict(err.to_string())
            }
            ClosingError::Storage(_) => Self::Storage(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_statuses() {
        assert_eq!(
            ClosingError::PeriodAlreadyClosed.error_code(),
            "PERIOD_ALREADY_CLOSED"
        );
        assert_eq!(ClosingError::PeriodAlreadyClosed.http_status_code(), 409);
        assert_eq!(
            ClosingError::NotFound(ClosingId::new()).http_status_code(),
            404
        );
        assert_eq!(ClosingError::InvalidCutoffHour(24).http_status_code(), 400);
    }
}
