//! Weighted-average cost recalculation.
//!
//! Receiving stock blends the incoming purchase price into the product's
//! cost: `(old_stock * old_cost + qty * price) / (old_stock + qty)`. With no
//! stock on hand the purchase price becomes the cost outright.

use rust_decimal::Decimal;

/// Decimal places kept on a unit cost.
const COST_SCALE: u32 = 4;

/// Decimal places kept on a percentage.
const PERCENT_SCALE: u32 = 2;

/// The outcome of a cost recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostUpdate {
    /// Cost per unit before the receipt.
    pub old_cost_price: Decimal,
    /// Cost per unit after the receipt.
    pub new_cost_price: Decimal,
    /// Relative change in percent (zero when the old cost was zero).
    pub price_change_percent: Decimal,
}

/// Computes the new weighted-average cost after receiving stock.
///
/// `old_stock` and `quantity` must be non-negative; a receipt of zero units
/// leaves the cost unchanged.
#[must_use]
pub fn weighted_average_cost(
    old_stock: Decimal,
    old_cost: Decimal,
    quantity: Decimal,
    purchase_price: Decimal,
) -> CostUpdate {
    let new_cost_price = if old_stock.is_zero() {
        purchase_price.round_dp(COST_SCALE)
    } else if quantity.is_zero() {
        old_cost
    } else {
        let total_value = old_stock * old_cost + quantity * purchase_price;
        let total_units = old_stock + quantity;
        (total_value / total_units).round_dp(COST_SCALE)
    };

    let price_change_percent = if old_cost.is_zero() {
        Decimal::ZERO
    } else {
        ((new_cost_price - old_cost) / old_cost * Decimal::ONE_HUNDRED).round_dp(PERCENT_SCALE)
    };

    CostUpdate {
        old_cost_price: old_cost,
        new_cost_price,
        price_change_percent,
    }
}
