//! Trial-balance recomputation and the audit pass itself.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rust_decimal::Decimal;

use kasbook_shared::types::OutletId;

use crate::accounts::{Account, AccountSubtype, AccountType};
use crate::ledger::{LedgerEntry, balance_tolerance};

use super::types::{
    AccountingEquation, DiagnosticFinding, DiagnosticReport, RebuiltBalance, Severity,
};

/// The system-account subtypes every outlet must carry.
#[must_use]
pub fn required_subtypes() -> Vec<AccountSubtype> {
    vec![
        AccountSubtype::Cash,
        AccountSubtype::Bank,
        AccountSubtype::AccountsReceivable,
        AccountSubtype::AccountsPayable,
        AccountSubtype::Inventory,
        AccountSubtype::SalesRevenue,
        AccountSubtype::ServiceRevenue,
        AccountSubtype::CostOfGoodsSold,
    ]
}

/// Rebuilds an account's balance from its ledger entries.
///
/// `opening_balance` plus the signed sum of entries on the account's normal
/// side, ignoring the cached `current_balance` entirely.
#[must_use]
pub fn rebuild_balance(account: &Account, entries: &[LedgerEntry]) -> Decimal {
    let movement: Decimal = entries
        .iter()
        .filter(|entry| entry.account_id == account.id)
        .map(|entry| account.balance_delta(entry.debit, entry.credit))
        .sum();
    account.opening_balance + movement
}

/// Runs the full audit pass over an outlet's accounts and entries.
///
/// Read-only: produces a report with severity-tagged findings instead of
/// failing or correcting anything.
#[must_use]
pub fn diagnose(
    outlet_id: OutletId,
    accounts: &[Account],
    entries: &[LedgerEntry],
) -> DiagnosticReport {
    let tolerance = balance_tolerance();
    let mut findings = Vec::new();

    // Per-account rebuild and cached-balance comparison.
    let mut balances = Vec::with_capacity(accounts.len());
    let mut by_type: HashMap<AccountType, Decimal> = HashMap::new();
    for account in accounts.iter().filter(|a| a.is_active) {
        let rebuilt = rebuild_balance(account, entries);
        let matches = (rebuilt - account.current_balance).abs() <= tolerance;
        if !matches {
            findings.push(DiagnosticFinding {
                severity: Severity::Warning,
                code: "BALANCE_DRIFT".to_string(),
                message: format!(
                    "Account {} cached balance {} differs from rebuilt {}",
                    account.code, account.current_balance, rebuilt
                ),
                recommendation: "Rebuild cached balances from the ledger".to_string(),
            });
        }
        *by_type.entry(account.account_type).or_insert(Decimal::ZERO) += rebuilt;
        balances.push(RebuiltBalance {
            account_id: account.id,
            code: account.code.clone(),
            cached: account.current_balance,
            rebuilt,
            matches,
        });
    }

    // Accounting equation over rebuilt balances.
    let total = |t: AccountType| by_type.get(&t).copied().unwrap_or(Decimal::ZERO);
    let equation = AccountingEquation {
        assets: total(AccountType::Asset),
        liabilities: total(AccountType::Liability),
        equity: total(AccountType::Equity),
        revenue: total(AccountType::Revenue),
        expenses: total(AccountType::Expense),
        difference: total(AccountType::Asset)
            - (total(AccountType::Liability)
                + total(AccountType::Equity)
                + total(AccountType::Revenue)
                - total(AccountType::Expense)),
    };
    let is_balanced = equation.difference.abs() <= tolerance;
    if !is_balanced {
        findings.push(DiagnosticFinding {
            severity: Severity::Critical,
            code: "EQUATION_IMBALANCE".to_string(),
            message: format!(
                "Accounting equation off by {}: assets {} vs liabilities {} + equity {} + net income {}",
                equation.difference,
                equation.assets,
                equation.liabilities,
                equation.equity,
                equation.revenue - equation.expenses
            ),
            recommendation: "Inspect recent vouchers for one-sided postings".to_string(),
        });
    }

    // Orphaned entries: account no longer resolves to an active account.
    let active_ids: HashSet<_> = accounts
        .iter()
        .filter(|a| a.is_active)
        .map(|a| a.id)
        .collect();
    let orphaned_entry_count = entries
        .iter()
        .filter(|entry| !active_ids.contains(&entry.account_id))
        .count();
    if orphaned_entry_count > 0 {
        findings.push(DiagnosticFinding {
            severity: Severity::Warning,
            code: "ORPHANED_ENTRIES".to_string(),
            message: format!(
                "{orphaned_entry_count} ledger entries reference inactive or missing accounts"
            ),
            recommendation: "Reactivate the accounts or reverse the affected vouchers".to_string(),
        });
    }

    // Required system accounts.
    let present: HashSet<_> = accounts
        .iter()
        .filter(|a| a.is_active)
        .filter_map(|a| a.subtype)
        .collect();
    for subtype in required_subtypes() {
        if !present.contains(&subtype) {
            findings.push(DiagnosticFinding {
                severity: Severity::Warning,
                code: "MISSING_SYSTEM_ACCOUNT".to_string(),
                message: format!("No active account with subtype {subtype:?}"),
                recommendation: "Provision the missing system account".to_string(),
            });
        }
    }

    DiagnosticReport {
        outlet_id,
        generated_at: Utc::now(),
        is_balanced,
        equation,
        balances,
        orphaned_entry_count,
        findings,
    }
}
