//! Balance validation for posting lines.
//!
//! Amounts are compared with a 0.01 absolute tolerance to absorb rounding in
//! upstream documents; zero-amount lines are skipped before validation.

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{EntrySide, PostingLine};

/// Absolute tolerance for debit/credit comparison.
#[must_use]
pub fn balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Totals over a set of posting lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// Sum of debit lines.
    pub debit: Decimal,
    /// Sum of credit lines.
    pub credit: Decimal,
}

impl LineTotals {
    /// The signed difference `debit - credit`.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Whether the totals balance within the posting tolerance.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.difference().abs() <= balance_tolerance()
    }
}

/// Drops zero-amount lines, keeping order.
#[must_use]
pub fn normalize_lines(lines: Vec<PostingLine>) -> Vec<PostingLine> {
    lines
        .into_iter()
        .filter(|line| !line.amount.is_zero())
        .collect()
}

/// Validates a set of normalized posting lines and returns their totals.
///
/// # Errors
///
/// - [`LedgerError::NoLines`] when no non-zero lines remain
/// - [`LedgerError::NegativeAmount`] for a negative line amount
pub fn validate_lines(lines: &[PostingLine]) -> Result<LineTotals, LedgerError> {
    if lines.is_empty() {
        return Err(LedgerError::NoLines);
    }

    let mut debit = Decimal::ZERO;
    let mut credit = Decimal::ZERO;

    for line in lines {
        if line.amount < Decimal::ZERO {
            return Err(LedgerError::NegativeAmount);
        }
        match line.side {
            EntrySide::Debit => debit += line.amount,
            EntrySide::Credit => credit += line.amount,
        }
    }

    Ok(LineTotals { debit, credit })
}
