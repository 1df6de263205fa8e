//! Closing periods and cash-basis profit figures.
//!
//! - Closing domain types and the pending/closed/locked state machine
//! - Period boundary resolution (chaining, cutoff hour, first-closing
//!   historical expansion)
//! - Pure profit and balance arithmetic over ledger entries and documents

pub mod error;
pub mod period;
pub mod profit;
pub mod types;

pub use error::ClosingError;
pub use period::{PeriodBounds, cutoff_time_label, resolve_period};
pub use profit::{
    CashBasisTotals, balance_from_entries, cash_basis_totals, cogs_from_entries,
    discount_from_entries, profit_margin, revenue_from_entries, tax_from_entries,
};
pub use types::{Closing, ClosingPreview, ClosingStatus, ClosingType};
