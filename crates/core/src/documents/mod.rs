//! Business documents that drive postings.
//!
//! Purchases, expenses, sales and sale returns are the source documents the
//! posting workflows translate into vouchers. Payment status and the paid
//! portion feed the cash-basis closing figures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use kasbook_shared::types::{DocumentId, OutletId, SaleId};

/// How much of a document has been paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Fully paid.
    Paid,
    /// Partially paid.
    Partial,
    /// Fully unpaid (on credit).
    Unpaid,
}

/// A purchase document (stock received from a supplier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseDocument {
    /// Unique identifier.
    pub id: DocumentId,
    /// Document number, e.g. `PUR-202506-00042`.
    pub document_number: String,
    /// Document date.
    pub date: DateTime<Utc>,
    /// Supplier name.
    pub supplier_name: String,
    /// Total document amount.
    pub grand_total: Decimal,
    /// Amount actually paid so far.
    pub amount_paid: Decimal,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Whether a reversal voucher has cancelled this document.
    pub is_reversed: bool,
    /// The outlet scope.
    pub outlet_id: OutletId,
}

/// An expense document (operating cost paid or owed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseDocument {
    /// Unique identifier.
    pub id: DocumentId,
    /// Document number, e.g. `EXP-202506-00007`.
    pub document_number: String,
    /// Document date.
    pub date: DateTime<Utc>,
    /// Expense category label.
    pub category: String,
    /// Total document amount.
    pub grand_total: Decimal,
    /// Amount actually paid so far.
    pub amount_paid: Decimal,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Whether a reversal voucher has cancelled this document.
    pub is_reversed: bool,
    /// The outlet scope.
    pub outlet_id: OutletId,
}

/// A completed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier.
    pub id: SaleId,
    /// Sale number, e.g. `JOB-202506-00123`.
    pub sale_number: String,
    /// Sale date.
    pub date: DateTime<Utc>,
    /// Total after discount and tax.
    pub grand_total: Decimal,
    /// Discount given.
    pub total_discount: Decimal,
    /// Tax collected.
    pub total_tax: Decimal,
    /// Cumulative amount already returned against this sale.
    pub total_returned_amount: Decimal,
    /// Amount actually paid so far.
    pub amount_paid: Decimal,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// The outlet scope.
    pub outlet_id: OutletId,
}

/// A return against a prior sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleReturn {
    /// Unique identifier.
    pub id: DocumentId,
    /// The sale being returned against.
    pub sale_id: SaleId,
    /// Return number, e.g. `RET-202506-00003`.
    pub return_number: String,
    /// Return date.
    pub date: DateTime<Utc>,
    /// Amount refunded.
    pub amount: Decimal,
    /// Why the goods came back.
    pub reason: String,
    /// The outlet scope.
    pub outlet_id: OutletId,
}

/// Errors raised by document rules.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A return would exceed what is still returnable on the sale.
    #[error("Return of {requested} exceeds the returnable amount {available}")]
    ReturnCapExceeded {
        /// The requested return amount.
        requested: Decimal,
        /// What is still returnable.
        available: Decimal,
    },

    /// Return amounts must be positive.
    #[error("Return amount must be positive")]
    NonPositiveReturn,

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DocumentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ReturnCapExceeded { .. } => "RETURN_CAP_EXCEEDED",
            Self::NonPositiveReturn => "NON_POSITIVE_RETURN",
            Self::SaleNotFound(_) => "SALE_NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ReturnCapExceeded { .. } => 422,
            Self::NonPositiveReturn => 400,
            Self::SaleNotFound(_) => 404,
            Self::Storage(_) => 500,
        }
    }
}

impl From<DocumentError> for kasbook_shared::error::AppError {
    fn from(err: DocumentError) -> Self {
        match &err {
            DocumentError::SaleNotFound(_) => Self::NotFound(err.to_string()),
            DocumentError::ReturnCapExceeded { .. } => Self::BusinessRule(err.to_string()),
            DocumentError::Storage(_) => Self::Storage(err.to_string()),
            DocumentError::NonPositiveReturn => Self::Validation(err.to_string()),
        }
    }
}

impl PaymentStatus {
    /// Whether any cash changed hands (cash-basis inclusion rule).
    #[must_use]
    pub const fn is_cash_basis(self) -> bool {
        matches!(self, Self::Paid | Self::Partial)
    }
}

impl Sale {
    /// The amount still returnable against this sale.
    #[must_use]
    pub fn returnable_amount(&self) -> Decimal {
        self.grand_total - self.total_returned_amount
    }
}

/// Validates a requested return amount against the sale's cap.
///
/// # Errors
///
/// - [`DocumentError::NonPositiveReturn`] for zero or negative amounts
/// - [`DocumentError::ReturnCapExceeded`] when the request exceeds
///   `grand_total - total_returned_amount`
pub fn validate_return_amount(sale: &Sale, requested: Decimal) -> Result<(), DocumentError> {
    if requested <= Decimal::ZERO {
        return Err(DocumentError::NonPositiveReturn);
    }
    let available = sale.returnable_amount();
    if requested > available {
        return Err(DocumentError::ReturnCapExceeded {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sale(grand_total: Decimal, returned: Decimal) -> Sale {
        Sale {
            id: SaleId::new(),
            sale_number: "JOB-202506-00001".to_string(),
            date: Utc::now(),
            grand_total,
            total_discount: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            total_returned_amount: returned,
            amount_paid: grand_total,
            payment_status: PaymentStatus::Paid,
            outlet_id: OutletId::new(),
        }
    }

    #[test]
    fn test_return_within_cap_passes() {
        let sale = sale(dec!(100), dec!(30));
        assert!(validate_return_amount(&sale, dec!(70)).is_ok());
        assert!(validate_return_amount(&sale, dec!(10)).is_ok());
    }

    #[test]
    fn test_return_beyond_cap_fails() {
        let sale = sale(dec!(100), dec!(30));
        let err = validate_return_amount(&sale, dec!(70.01)).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::ReturnCapExceeded { requested, available }
                if requested == dec!(70.01) && available == dec!(70)
        ));
    }

    #[test]
    fn test_non_positive_return_fails() {
        let sale = sale(dec!(100), Decimal::ZERO);
        assert!(matches!(
            validate_return_amount(&sale, Decimal::ZERO),
            Err(DocumentError::NonPositiveReturn)
        ));
        assert!(matches!(
            validate_return_amount(&sale, dec!(-5)),
            Err(DocumentError::NonPositiveReturn)
        ));
    }

    #[test]
    fn test_cash_basis_rule() {
        assert!(PaymentStatus::Paid.is_cash_basis());
        assert!(PaymentStatus::Partial.is_cash_basis());
        assert!(!PaymentStatus::Unpaid.is_cash_basis());
    }
}
