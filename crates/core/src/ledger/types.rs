//! Ledger domain types for voucher creation and posting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasbook_shared::types::{AccountId, LedgerEntryId, OutletId, UserId, VoucherId};

/// Entry side: either Debit or Credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntrySide {
    /// Returns the opposite side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Voucher type classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherType {
    /// General journal entry.
    Journal,
    /// Incoming payment.
    Receipt,
    /// Outgoing payment.
    Payment,
    /// Purchase posting.
    Purchase,
    /// Expense posting.
    Expense,
    /// Sale posting.
    Sale,
    /// Sale-return posting.
    Return,
    /// Reversal of a previous voucher.
    Reversal,
}

/// Voucher lifecycle status.
///
/// Vouchers are posted immediately and never mutated afterwards; a reversal
/// is a new voucher, not an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoucherStatus {
    /// Posted to the ledger (immutable).
    Posted,
    /// Approved after review.
    Approved,
}

/// What business document a voucher or entry traces back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferenceType {
    /// Opening-balance posting.
    OpeningBalance,
    /// Purchase document.
    Purchase,
    /// Expense document.
    Expense,
    /// Sale document.
    Sale,
    /// Sale-return document.
    Return,
    /// Stock adjustment.
    Adjustment,
    /// Reversal of another voucher.
    Reversal,
}

/// A reference back to the source document of a posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    /// The kind of source document.
    pub reference_type: ReferenceType,
    /// Source document ID, if any.
    pub reference_id: Option<uuid::Uuid>,
    /// Source document number, if any.
    pub reference_number: Option<String>,
}

impl DocumentRef {
    /// A bare reference carrying only the type.
    #[must_use]
    pub const fn bare(reference_type: ReferenceType) -> Self {
        Self {
            reference_type,
            reference_id: None,
            reference_number: None,
        }
    }
}

/// One input line of a posting: account, side, positive amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingLine {
    /// The account to post to.
    pub account_id: AccountId,
    /// Debit or credit.
    pub side: EntrySide,
    /// The amount (must be non-negative; zero lines are skipped).
    pub amount: Decimal,
}

impl PostingLine {
    /// Creates a debit line.
    #[must_use]
    pub const fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            side: EntrySide::Debit,
            amount,
        }
    }

    /// Creates a credit line.
    #[must_use]
    pub const fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            side: EntrySide::Credit,
            amount,
        }
    }
}

/// One embedded line of a persisted voucher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherLine {
    /// The account posted to.
    pub account_id: AccountId,
    /// Denormalized account name at posting time.
    pub account_name: String,
    /// Debit amount (zero if credit).
    pub debit: Decimal,
    /// Credit amount (zero if debit).
    pub credit: Decimal,
}

/// A balanced journal document grouping debit/credit lines.
///
/// Immutable once created; the audit trail is preserved by reversing, never
/// by editing or deleting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voucher {
    /// Unique identifier.
    pub id: VoucherId,
    /// Human-readable number, unique per outlet+month+type.
    pub voucher_number: String,
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Posting date.
    pub date: DateTime<Utc>,
    /// Narration describing the posting.
    pub narration: String,
    /// Embedded copy of the lines.
    pub lines: Vec<VoucherLine>,
    /// Sum of line debits.
    pub total_debit: Decimal,
    /// Sum of line credits.
    pub total_credit: Decimal,
    /// Lifecycle status.
    pub status: VoucherStatus,
    /// Reference back to the source document.
    pub reference: DocumentRef,
    /// The outlet scope.
    pub outlet_id: OutletId,
    /// The user who created the voucher.
    pub created_by: UserId,
}

/// One immutable debit-or-credit line belonging to a voucher and an account.
///
/// Both fields are present for uniform aggregation; exactly one is non-zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// The voucher this entry belongs to.
    pub voucher_id: VoucherId,
    /// Denormalized voucher number.
    pub voucher_number: String,
    /// The account posted to.
    pub account_id: AccountId,
    /// Debit amount (zero if credit).
    pub debit: Decimal,
    /// Credit amount (zero if debit).
    pub credit: Decimal,
    /// Posting date.
    pub date: DateTime<Utc>,
    /// Reference back to the source document type.
    pub reference_type: ReferenceType,
    /// The outlet scope.
    pub outlet_id: OutletId,
}

/// Signed cached-balance change for one account, applied with a posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The account to adjust.
    pub account_id: AccountId,
    /// Signed delta on the account's normal side.
    pub delta: Decimal,
}

/// Result of a successful posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingReceipt {
    /// The created voucher's ID.
    pub voucher_id: VoucherId,
    /// The created voucher's number.
    pub voucher_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_entry_side_opposite() {
        assert_eq!(EntrySide::Debit.opposite(), EntrySide::Credit);
        assert_eq!(EntrySide::Credit.opposite(), EntrySide::Debit);
    }

    #[test]
    fn test_posting_line_constructors() {
        let account = AccountId::new();
        let debit = PostingLine::debit(account, dec!(100));
        assert_eq!(debit.side, EntrySide::Debit);
        assert_eq!(debit.amount, dec!(100));

        let credit = PostingLine::credit(account, dec!(100));
        assert_eq!(credit.side, EntrySide::Credit);
    }

    #[test]
    fn test_reference_type_serializes_screaming_snake() {
        let json = serde_json::to_string(&ReferenceType::OpeningBalance).unwrap();
        assert_eq!(json, "\"OPENING_BALANCE\"");
        let json = serde_json::to_string(&ReferenceType::Purchase).unwrap();
        assert_eq!(json, "\"PURCHASE\"");
    }
}
