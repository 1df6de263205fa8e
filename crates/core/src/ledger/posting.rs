//! Posting preparation: turns validated posting lines into a voucher, its
//! ledger entries, and the signed cached-balance deltas to apply with them.
//!
//! This module is pure. It receives the accounts it needs as a map and leaves
//! number allocation and persistence to the caller, so the same preparation
//! path serves every document workflow.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use kasbook_shared::types::{AccountId, LedgerEntryId, OutletId, UserId, VoucherId};

use crate::accounts::Account;

use super::error::LedgerError;
use super::types::{
    BalanceDelta, DocumentRef, EntrySide, LedgerEntry, PostingLine, Voucher, VoucherLine,
    VoucherStatus, VoucherType,
};
use super::validation::{normalize_lines, validate_lines};

/// How an out-of-balance posting is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalancePolicy {
    /// Reject any imbalance beyond the posting tolerance.
    Strict,
    /// Add a balancing line on the deficient side.
    ///
    /// Used for opening balances, where the residual posts to opening-balance
    /// equity.
    AutoBalance {
        /// The account that absorbs the residual.
        account_id: AccountId,
    },
}

/// Input for preparing a posting.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// Voucher type.
    pub voucher_type: VoucherType,
    /// Posting date.
    pub date: DateTime<Utc>,
    /// Narration describing the posting.
    pub narration: String,
    /// The debit/credit lines.
    pub lines: Vec<PostingLine>,
    /// Reference back to the source document.
    pub reference: DocumentRef,
    /// The outlet scope.
    pub outlet_id: OutletId,
    /// The user creating the posting.
    pub created_by: UserId,
}

/// A fully prepared posting, ready to be committed atomically.
#[derive(Debug, Clone)]
pub struct PreparedPosting {
    /// The voucher to insert.
    pub voucher: Voucher,
    /// One ledger entry per line.
    pub entries: Vec<LedgerEntry>,
    /// Signed cached-balance deltas, aggregated per account.
    pub balance_deltas: Vec<BalanceDelta>,
}

/// Prepares a posting from a request and a pre-allocated voucher number.
///
/// Zero-amount lines are dropped. Every remaining line's account must exist
/// in `accounts` and be active. Totals must balance within the tolerance
/// unless `policy` auto-balances the residual.
///
/// # Errors
///
/// - [`LedgerError::NoLines`] when no non-zero lines remain
/// - [`LedgerError::NegativeAmount`] for a negative line amount
/// - [`LedgerError::AccountNotFound`] / [`LedgerError::AccountInactive`]
/// - [`LedgerError::Imbalance`] under [`BalancePolicy::Strict`]
pub fn prepare_posting(
    request: PostingRequest,
    voucher_number: String,
    accounts: &HashMap<AccountId, Account>,
    policy: BalancePolicy,
) -> Result<PreparedPosting, LedgerError> {
    let mut lines = normalize_lines(request.lines);
    let totals = validate_lines(&lines)?;

    if !totals.is_balanced() {
        match policy {
            BalancePolicy::Strict => {
                return Err(LedgerError::Imbalance {
                    debit: totals.debit,
                    credit: totals.credit,
                });
            }
            BalancePolicy::AutoBalance { account_id } => {
                let difference = totals.difference();
                let side = if difference > Decimal::ZERO {
                    EntrySide::Credit
                } else {
                    EntrySide::Debit
                };
                lines.push(PostingLine {
                    account_id,
                    side,
                    amount: difference.abs(),
                });
            }
        }
    }

    for line in &lines {
        let account = accounts
            .get(&line.account_id)
            .ok_or(LedgerError::AccountNotFound(line.account_id))?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(line.account_id));
        }
    }

    // Re-total after a possible auto-balance line.
    let totals = validate_lines(&lines)?;

    let voucher_id = VoucherId::new();
    let mut voucher_lines = Vec::with_capacity(lines.len());
    let mut entries = Vec::with_capacity(lines.len());
    let mut deltas: HashMap<AccountId, Decimal> = HashMap::new();

    for line in &lines {
        let account = accounts
            .get(&line.account_id)
            .ok_or(LedgerError::AccountNotFound(line.account_id))?;
        let (debit, credit) = match line.side {
            EntrySide::Debit => (line.amount, Decimal::ZERO),
            EntrySide::Credit => (Decimal::ZERO, line.amount),
        };

        voucher_lines.push(VoucherLine {
            account_id: line.account_id,
            account_name: account.name.clone(),
            debit,
            credit,
        });
        entries.push(LedgerEntry {
            id: LedgerEntryId::new(),
            voucher_id,
            voucher_number: voucher_number.clone(),
            account_id: line.account_id,
            debit,
            credit,
            date: request.date,
            reference_type: request.reference.reference_type,
            outlet_id: request.outlet_id,
        });
        *deltas.entry(line.account_id).or_insert(Decimal::ZERO) +=
            account.balance_delta(debit, credit);
    }

    let voucher = Voucher {
        id: voucher_id,
        voucher_number,
        voucher_type: request.voucher_type,
        date: request.date,
        narration: request.narration,
        lines: voucher_lines,
        total_debit: totals.debit,
        total_credit: totals.credit,
        status: VoucherStatus::Posted,
        reference: request.reference,
        outlet_id: request.outlet_id,
        created_by: request.created_by,
    };

    let balance_deltas = deltas
        .into_iter()
        .map(|(account_id, delta)| BalanceDelta { account_id, delta })
        .collect();

    Ok(PreparedPosting {
        voucher,
        entries,
        balance_deltas,
    })
}
