//! Inventory domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasbook_shared::types::{MovementId, OutletId, ProductId, UserId};

use crate::ledger::DocumentRef;

/// What caused a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Stock received from a purchase.
    Purchase,
    /// Manual stock adjustment (requires a reason).
    Adjustment,
    /// Stock returned by a customer.
    Return,
    /// Stock sold.
    Sale,
}

/// Whether stock moved into or out of the outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Stock increased.
    In,
    /// Stock decreased.
    Out,
}

/// One immutable row of a product's stock history.
///
/// `quantity` is signed; `balance_after` is the running stock level after
/// this movement, chained from the previous movement of the same product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryMovement {
    /// Unique identifier.
    pub id: MovementId,
    /// The product that moved.
    pub product_id: ProductId,
    /// What caused the movement.
    pub movement_type: MovementType,
    /// In or out, derived from the signed quantity.
    pub direction: Direction,
    /// Signed quantity change.
    pub quantity: Decimal,
    /// Cost per unit at the time of the movement.
    pub unit_cost: Decimal,
    /// `quantity.abs() * unit_cost`.
    pub total_value: Decimal,
    /// Running stock level after this movement.
    pub balance_after: Decimal,
    /// Reason for the movement (mandatory for adjustments).
    pub reason: Option<String>,
    /// Reference back to the source document.
    pub reference: DocumentRef,
    /// The outlet scope.
    pub outlet_id: OutletId,
    /// When the movement was recorded.
    pub created_at: DateTime<Utc>,
    /// The user who recorded the movement.
    pub created_by: UserId,
}

/// A sellable product with cached stock and weighted-average cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Stock-keeping unit code.
    pub sku: String,
    /// Cached stock level (projection of the movement chain).
    pub stock: Decimal,
    /// Weighted-average cost per unit.
    pub cost_price: Decimal,
    /// Selling price per unit.
    pub selling_price: Decimal,
    /// The outlet scope.
    pub outlet_id: OutletId,
    /// Whether the product can be sold.
    pub is_active: bool,
}
