//! Cash-basis profit arithmetic.
//!
//! Revenue, COGS, discount and tax come from ledger entries (discounts and
//! returns already net out there). Purchases and expenses come from
//! documents, counting only the paid portion; fully unpaid documents are
//! reported separately instead of silently inflating costs.

use std::collections::HashSet;

use rust_decimal::Decimal;

use kasbook_shared::types::AccountId;

use crate::documents::PaymentStatus;
use crate::ledger::LedgerEntry;

/// The paid and unpaid sides of a document set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CashBasisTotals {
    /// Sum of `amount_paid` over paid and partially paid documents.
    pub paid: Decimal,
    /// Sum of `grand_total` over fully unpaid documents.
    pub unpaid: Decimal,
}

/// Revenue over entries of revenue-type accounts: `sum(credit) - sum(debit)`.
#[must_use]
pub fn revenue_from_entries(
    entries: &[LedgerEntry],
    revenue_accounts: &HashSet<AccountId>,
) -> Decimal {
    entries
        .iter()
        .filter(|entry| revenue_accounts.contains(&entry.account_id))
        .map(|entry| entry.credit - entry.debit)
        .sum()
}

/// COGS over entries of COGS-subtype accounts: `sum(debit)`.
#[must_use]
pub fn cogs_from_entries(entries: &[LedgerEntry], cogs_accounts: &HashSet<AccountId>) -> Decimal {
    entries
        .iter()
        .filter(|entry| cogs_accounts.contains(&entry.account_id))
        .map(|entry| entry.debit)
        .sum()
}

/// Discount given over entries of sales-discount accounts:
/// `sum(debit) - sum(credit)`. The contra account is debit-normal, so a
/// reversal's credit nets back out.
#[must_use]
pub fn discount_from_entries(
    entries: &[LedgerEntry],
    discount_accounts: &HashSet<AccountId>,
) -> Decimal {
    entries
        .iter()
        .filter(|entry| discount_accounts.contains(&entry.account_id))
        .map(|entry| entry.debit - entry.credit)
        .sum()
}

/// Tax collected over entries of tax-payable accounts:
/// `sum(credit) - sum(debit)`. Refund and reversal debits reduce the
/// liability.
#[must_use]
pub fn tax_from_entries(entries: &[LedgerEntry], tax_accounts: &HashSet<AccountId>) -> Decimal {
    entries
        .iter()
        .filter(|entry| tax_accounts.contains(&entry.account_id))
        .map(|entry| entry.credit - entry.debit)
        .sum()
}

/// Debit-normal balance over entries of the given accounts:
/// `sum(debit) - sum(credit)`. Used for cash and bank balances.
#[must_use]
pub fn balance_from_entries(entries: &[LedgerEntry], accounts: &HashSet<AccountId>) -> Decimal {
    entries
        .iter()
        .filter(|entry| accounts.contains(&entry.account_id))
        .map(|entry| entry.debit - entry.credit)
        .sum()
}

/// Splits documents into paid and unpaid totals under the cash-basis rule.
///
/// `documents` yields `(grand_total, amount_paid, payment_status)` triples.
#[must_use]
pub fn cash_basis_totals(
    documents: impl IntoIterator<Item = (Decimal, Decimal, PaymentStatus)>,
) -> CashBasisTotals {
    let mut totals = CashBasisTotals::default();
    for (grand_total, amount_paid, status) in documents {
        if status.is_cash_basis() {
            totals.paid += amount_paid;
        } else {
            totals.unpaid += grand_total;
        }
    }
    totals
}

/// A profit figure as a percentage of revenue, rounded to two places.
///
/// Zero revenue yields a zero margin.
#[must_use]
pub fn profit_margin(profit: Decimal, revenue: Decimal) -> Decimal {
    if revenue.is_zero() {
        Decimal::ZERO
    } else {
        (profit / revenue * Decimal::ONE_HUNDRED).round_dp(2)
    }
}
