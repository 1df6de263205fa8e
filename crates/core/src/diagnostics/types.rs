//! Diagnostic report types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasbook_shared::types::{AccountId, OutletId};

/// How urgently a finding needs operator attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; no action needed.
    Info,
    /// Worth investigating.
    Warning,
    /// The books do not balance.
    Critical,
}

/// One finding from the audit pass. Returned as data, never thrown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticFinding {
    /// How urgent the finding is.
    pub severity: Severity,
    /// Stable machine-readable code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
    /// Suggested operator action.
    pub recommendation: String,
}

/// The accounting equation evaluated from rebuilt balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingEquation {
    /// Total assets (debit-normal).
    pub assets: Decimal,
    /// Total liabilities (credit-normal).
    pub liabilities: Decimal,
    /// Total equity (credit-normal).
    pub equity: Decimal,
    /// Total revenue (credit-normal).
    pub revenue: Decimal,
    /// Total expenses (debit-normal).
    pub expenses: Decimal,
    /// `assets - (liabilities + equity + revenue - expenses)`.
    pub difference: Decimal,
}

/// A single account's cached balance against its rebuilt value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuiltBalance {
    /// The account.
    pub account_id: AccountId,
    /// Account code for readability.
    pub code: String,
    /// The cached `current_balance`.
    pub cached: Decimal,
    /// Balance recomputed from ledger entries.
    pub rebuilt: Decimal,
    /// Whether cached and rebuilt agree within tolerance.
    pub matches: bool,
}

/// The full result of a diagnostic pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticReport {
    /// The outlet audited.
    pub outlet_id: OutletId,
    /// When the pass ran.
    pub generated_at: DateTime<Utc>,
    /// Whether the accounting equation holds within tolerance.
    pub is_balanced: bool,
    /// The equation's components.
    pub equation: AccountingEquation,
    /// Per-account cached-vs-rebuilt comparison.
    pub balances: Vec<RebuiltBalance>,
    /// Ledger entries whose account no longer resolves.
    pub orphaned_entry_count: usize,
    /// Severity-tagged findings.
    pub findings: Vec<DiagnosticFinding>,
}

impl DiagnosticReport {
    /// The highest severity present, if any findings exist.
    #[must_use]
    pub fn max_severity(&self) -> Option<Severity> {
        self.findings.iter().map(|f| f.severity).max()
    }
}
