//! Inventory movements and weighted-average costing.
//!
//! - Movement domain types with signed quantities and running balances
//! - Weighted-average cost recalculation on purchase receipt
//! - Movement chaining validation

pub mod cost;
pub mod error;
pub mod movement;
pub mod types;

pub use cost::{CostUpdate, weighted_average_cost};
pub use error::InventoryError;
pub use movement::{chain_balance, direction_for, validate_adjustment_reason, verify_chain};
pub use types::{Direction, InventoryMovement, MovementType, Product};
