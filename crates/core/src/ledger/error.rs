//! Ledger error types for validation and posting failures.

use rust_decimal::Decimal;
use thiserror::Error;

use kasbook_shared::types::{AccountId, VoucherId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Posting must have at least one non-zero line.
    #[error("Posting must have at least one non-zero line")]
    NoLines,

    /// Line amount cannot be negative.
    #[error("Line amount cannot be negative")]
    NegativeAmount,

    /// Posting is not balanced (debits != credits beyond tolerance).
    #[error("Posting is not balanced. Debit: {debit}, Credit: {credit}")]
    Imbalance {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Missing or malformed input.
    #[error("Validation error: {0}")]
    Validation(String),

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    // ========== Voucher Errors ==========
    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(VoucherId),

    /// Only posted vouchers can be reversed.
    #[error("Voucher {0} is not posted and cannot be reversed")]
    NotReversible(VoucherId),

    /// Reversal reason must not be empty.
    #[error("Reversal reason must not be empty")]
    ReasonRequired,

    // ========== Storage Errors ==========
    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoLines => "NO_LINES",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::Imbalance { .. } => "LEDGER_IMBALANCE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::NotReversible(_) => "NOT_REVERSIBLE",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NoLines
            | Self::NegativeAmount
            | Self::Validation(_)
            | Self::AccountInactive(_)
            | Self::NotReversible(_)
            | Self::ReasonRequired => 400,
            Self::Imbalance { .. } => 422,
            Self::AccountNotFound(_) | Self::VoucherNotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }
}

impl From<LedgerError> for kasbook_shared::error::AppError {
    fn from(err: LedgerError) -> Self {
        match &err {
            LedgerError::AccountNotFound(_) | LedgerError::VoucherNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            LedgerError::Imbalance { .. } => Self::BusinessRule(err.to_string()),
            LedgerError::Storage(_) => Self::Storage(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NoLines.error_code(), "NO_LINES");
        assert_eq!(
            LedgerError::Imbalance {
                debit: dec!(100),
                credit: dec!(50)
            }
            .error_code(),
            "LEDGER_IMBALANCE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::NoLines.http_status_code(), 400);
        assert_eq!(
            LedgerError::Imbalance {
                debit: dec!(100),
                credit: dec!(50)
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::AccountNotFound(AccountId::new()).http_status_code(),
            404
        );
        assert_eq!(LedgerError::Storage("boom".into()).http_status_code(), 500);
    }

    #[test]
    fn test_imbalance_display() {
        let err = LedgerError::Imbalance {
            debit: dec!(100.00),
            credit: dec!(50.00),
        };
        assert_eq!(
            err.to_string(),
            "Posting is not balanced. Debit: 100.00, Credit: 50.00"
        );
    }
}
