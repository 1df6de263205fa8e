//! Inventory engines: the movement ledger and the weighted-average cost
//! engine.
//!
//! The cost engine only rewrites a product's cost basis; it never moves
//! quantity. The purchase workflow invokes both together so cost and stock
//! stay in step.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;

use kasbook_core::inventory::{
    CostUpdate, Direction, InventoryError, InventoryMovement, MovementType, chain_balance,
    direction_for, validate_adjustment_reason, weighted_average_cost,
};
use kasbook_core::ledger::DocumentRef;
use kasbook_shared::types::{MovementId, OutletId, ProductId, UserId};

use crate::repositories::{MovementRepository, ProductRepository};

/// Input for recording one stock movement.
#[derive(Debug, Clone)]
pub struct MovementRecord {
    /// The product that moved.
    pub product_id: ProductId,
    /// What caused the movement.
    pub movement_type: MovementType,
    /// Signed quantity change.
    pub quantity: Decimal,
    /// Cost per unit at the time of the movement.
    pub unit_cost: Decimal,
    /// Reason (mandatory for adjustments).
    pub reason: Option<String>,
    /// Reference back to the source document.
    pub reference: DocumentRef,
    /// The outlet scope.
    pub outlet_id: OutletId,
    /// The user recording the movement.
    pub recorded_by: UserId,
}

/// Append-only stock history per product.
#[derive(Clone)]
pub struct InventoryMovementLedger {
    movements: Arc<dyn MovementRepository>,
    products: Arc<dyn ProductRepository>,
}

impl InventoryMovementLedger {
    /// Creates a movement ledger.
    #[must_use]
    pub fn new(
        movements: Arc<dyn MovementRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            movements,
            products,
        }
    }

    /// Records a movement, chaining `balance_after` from the previous one
    /// and mirroring it onto the cached product stock.
    ///
    /// # Errors
    ///
    /// - [`InventoryError::ZeroQuantity`] for a zero quantity
    /// - [`InventoryError::ReasonRequired`] for a reasonless adjustment
    /// - [`InventoryError::ProductNotFound`] when the product is missing
    pub async fn record(
        &self,
        record: MovementRecord,
    ) -> Result<InventoryMovement, InventoryError> {
        if record.quantity.is_zero() {
            return Err(InventoryError::ZeroQuantity);
        }
        validate_adjustment_reason(record.movement_type, record.reason.as_deref())?;

        if self.products.product(record.product_id).await?.is_none() {
            return Err(InventoryError::ProductNotFound(record.product_id));
        }

        let previous_balance = self
            .movements
            .latest_movement(record.product_id)
            .await?
            .map_or(Decimal::ZERO, |m| m.balance_after);
        let balance_after = chain_balance(previous_balance, record.quantity);

        let movement = InventoryMovement {
            id: MovementId::new(),
            product_id: record.product_id,
            movement_type: record.movement_type,
            direction: direction_for(record.movement_type, record.quantity),
            quantity: record.quantity,
            unit_cost: record.unit_cost,
            total_value: record.quantity.abs() * record.unit_cost,
            balance_after,
            reason: record.reason,
            reference: record.reference,
            outlet_id: record.outlet_id,
            created_at: Utc::now(),
            created_by: record.recorded_by,
        };
        self.movements.append_movement(movement.clone()).await?;
        tracing::debug!(
            product_id = %movement.product_id,
            quantity = %movement.quantity,
            balance_after = %movement.balance_after,
            "recorded stock movement"
        );
        Ok(movement)
    }

    /// Read-time direction of a movement, for display.
    #[must_use]
    pub fn direction(movement: &InventoryMovement) -> Direction {
        direction_for(movement.movement_type, movement.quantity)
    }
}

/// Rewrites product cost on purchase receipt.
#[derive(Clone)]
pub struct WeightedAverageCostEngine {
    products: Arc<dyn ProductRepository>,
}

impl WeightedAverageCostEngine {
    /// Creates a cost engine.
    #[must_use]
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Blends a received quantity and price into the product's cost and
    /// persists the new value.
    ///
    /// # Errors
    ///
    /// [`InventoryError::ProductNotFound`] when the product is missing.
    pub async fn update_cost(
        &self,
        product_id: ProductId,
        purchase_qty: Decimal,
        purchase_price: Decimal,
    ) -> Result<CostUpdate, InventoryError> {
        let product = self
            .products
            .product(product_id)
            .await?
            .ok_or(InventoryError::ProductNotFound(product_id))?;

        let update = weighted_average_cost(
            product.stock,
            product.cost_price,
            purchase_qty,
            purchase_price,
        );
        self.products
            .set_cost_price(product_id, update.new_cost_price)
            .await?;
        tracing::debug!(
            %product_id,
            old = %update.old_cost_price,
            new = %update.new_cost_price,
            "updated weighted-average cost"
        );
        Ok(update)
    }
}
