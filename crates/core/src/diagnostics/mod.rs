//! Trial-balance diagnostics.
//!
//! A read-only audit pass: recomputes balances from ledger entries, checks
//! the accounting equation, and reports findings as data. It never throws
//! and never writes.

pub mod trial_balance;
pub mod types;

pub use trial_balance::{diagnose, rebuild_balance, required_subtypes};
pub use types::{
    AccountingEquation, DiagnosticFinding, DiagnosticReport, RebuiltBalance, Severity,
};
