//! Closing domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasbook_shared::types::{ClosingId, OutletId, UserId};

/// The granularity of a closing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosingType {
    /// One business day.
    Day,
    /// One calendar month.
    Month,
}

/// Closing lifecycle. Transitions are one-way: pending, closed, locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosingStatus {
    /// Previewed but not yet committed.
    Pending,
    /// Committed; feeds the next period's start.
    Closed,
    /// Frozen; no further edits of any kind.
    Locked,
}

impl ClosingStatus {
    /// Whether this status may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Closed) | (Self::Closed, Self::Locked)
        )
    }
}

/// A committed closing period with its profit figures.
///
/// Immutable once locked. For one outlet and type, `period_start` equals the
/// previous closing's `period_end` (no gap, no overlap) except for the first
/// closing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Closing {
    /// Unique identifier.
    pub id: ClosingId,
    /// Day or month.
    pub closing_type: ClosingType,
    /// The business date being closed.
    pub closing_date: NaiveDate,
    /// Inclusive period start.
    pub period_start: DateTime<Utc>,
    /// Exclusive period end.
    pub period_end: DateTime<Utc>,
    /// Revenue over the period (ledger-driven).
    pub total_revenue: Decimal,
    /// Cost of goods sold over the period (ledger-driven).
    pub total_cogs: Decimal,
    /// Cash-basis purchases over the period (document-driven).
    pub total_purchases: Decimal,
    /// Cash-basis expenses over the period (document-driven).
    pub total_expenses: Decimal,
    /// `total_revenue - total_cogs`.
    pub gross_profit: Decimal,
    /// `total_revenue - (total_cogs + total_purchases + total_expenses)`.
    pub net_profit: Decimal,
    /// Cash balance just before the period started.
    pub opening_cash: Decimal,
    /// Bank balance just before the period started.
    pub opening_bank: Decimal,
    /// Cash balance at period end.
    pub closing_cash: Decimal,
    /// Bank balance at period end.
    pub closing_bank: Decimal,
    /// Lifecycle status.
    pub status: ClosingStatus,
    /// The user who committed the closing.
    pub closed_by: Option<UserId>,
    /// When the closing was committed.
    pub closed_at: Option<DateTime<Utc>>,
    /// The outlet scope.
    pub outlet_id: OutletId,
}

/// Preview of a closing period before it is committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingPreview {
    /// Whether this would be the outlet's first closing of this type.
    pub is_first_closing: bool,
    /// Inclusive period start.
    pub period_start: DateTime<Utc>,
    /// Exclusive period end.
    pub period_end: DateTime<Utc>,
    /// The late-night cutoff applied, e.g. `"05:00"`.
    pub cutoff_time: String,
    /// Cash balance just before the period started.
    pub opening_cash: Decimal,
    /// Bank balance just before the period started.
    pub opening_bank: Decimal,
    /// Cash balance projected at period end.
    pub projected_closing_cash: Decimal,
    /// Bank balance projected at period end.
    pub projected_closing_bank: Decimal,
    /// Revenue over the period.
    pub total_revenue: Decimal,
    /// Discount given over the period.
    pub total_discount: Decimal,
    /// Tax collected over the period.
    pub total_tax: Decimal,
    /// Cost of goods sold over the period.
    #[serde(rename = "totalCOGS")]
    pub total_cogs: Decimal,
    /// Cash-basis purchases over the period.
    pub total_purchases: Decimal,
    /// Cash-basis expenses over the period.
    pub total_expenses: Decimal,
    /// `totalRevenue - totalCOGS`.
    pub gross_profit: Decimal,
    /// `totalRevenue - (totalCOGS + totalPurchases + totalExpenses)`.
    pub net_profit: Decimal,
    /// Gross profit as a percentage of revenue.
    pub gross_profit_margin: Decimal,
    /// Net profit as a percentage of revenue.
    pub net_profit_margin: Decimal,
    /// Days of pre-period history folded into a first closing.
    pub historical_days_included: i64,
    /// Grand total of fully unpaid purchase documents (reported, not
    /// included in the cash-basis figures).
    pub unpaid_purchases_total: Decimal,
    /// Always `"cash-basis"`.
    pub data_source: String,
}
