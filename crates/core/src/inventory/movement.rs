//! Movement chaining rules.
//!
//! Each movement's `balance_after` equals the previous movement's
//! `balance_after` plus its own signed quantity, giving every product a
//! verifiable stock history.

use rust_decimal::Decimal;

use super::error::InventoryError;
use super::types::{Direction, InventoryMovement, MovementType};

/// Derives the direction from a movement's signed quantity.
///
/// Adjustments with quantity zero count as `In` (a no-op correction is
/// recorded as an increase of nothing); all other zero quantities are
/// rejected before this point.
#[must_use]
pub const fn direction_for(movement_type: MovementType, quantity: Decimal) -> Direction {
    match movement_type {
        MovementType::Adjustment => {
            if quantity.is_sign_negative() {
                Direction::Out
            } else {
                Direction::In
            }
        }
        MovementType::Purchase | MovementType::Return => Direction::In,
        MovementType::Sale => Direction::Out,
    }
}

/// The running balance after applying a signed quantity to the previous
/// balance.
#[must_use]
pub fn chain_balance(previous_balance: Decimal, quantity: Decimal) -> Decimal {
    previous_balance + quantity
}

/// Validates the reason of a stock adjustment.
///
/// # Errors
///
/// [`InventoryError::ReasonRequired`] for adjustments without a non-empty
/// reason. Other movement types pass unconditionally.
pub fn validate_adjustment_reason(
    movement_type: MovementType,
    reason: Option<&str>,
) -> Result<(), InventoryError> {
    if movement_type == MovementType::Adjustment
        && !reason.is_some_and(|r| !r.trim().is_empty())
    {
        return Err(InventoryError::ReasonRequired);
    }
    Ok(())
}

/// Verifies that a product's movement history chains correctly.
///
/// `movements` must be in chronological order and all belong to the same
/// product, starting from a zero balance.
///
/// # Errors
///
/// [`InventoryError::BrokenChain`] at the first movement whose recorded
/// `balance_after` disagrees with the chained balance.
pub fn verify_chain(movements: &[InventoryMovement]) -> Result<(), InventoryError> {
    let mut balance = Decimal::ZERO;
    for movement in movements {
        balance = chain_balance(balance, movement.quantity);
        if movement.balance_after != balance {
            return Err(InventoryError::BrokenChain {
                product_id: movement.product_id,
                expected: balance,
                found: movement.balance_after,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DocumentRef, ReferenceType};
    use chrono::Utc;
    use kasbook_shared::types::{MovementId, OutletId, ProductId, UserId};
    use rust_decimal_macros::dec;

    fn movement(
        product_id: ProductId,
        movement_type: MovementType,
        quantity: Decimal,
        balance_after: Decimal,
    ) -> InventoryMovement {
        InventoryMovement {
            id: MovementId::new(),
            product_id,
            movement_type,
            direction: direction_for(movement_type, quantity),
            quantity,
            unit_cost: dec!(5),
            total_value: quantity.abs() * dec!(5),
            balance_after,
            reason: None,
            reference: DocumentRef::bare(ReferenceType::Adjustment),
            outlet_id: OutletId::new(),
            created_at: Utc::now(),
            created_by: UserId::new(),
        }
    }

    #[test]
    fn test_direction_derivation() {
        assert_eq!(direction_for(MovementType::Purchase, dec!(5)), Direction::In);
        assert_eq!(direction_for(MovementType::Return, dec!(2)), Direction::In);
        assert_eq!(direction_for(MovementType::Sale, dec!(-3)), Direction::Out);
        assert_eq!(direction_for(MovementType::Adjustment, dec!(4)), Direction::In);
        assert_eq!(direction_for(MovementType::Adjustment, dec!(-4)), Direction::Out);
        assert_eq!(direction_for(MovementType::Adjustment, Decimal::ZERO), Direction::In);
    }

    #[test]
    fn test_adjustment_requires_reason() {
        assert!(validate_adjustment_reason(MovementType::Adjustment, None).is_err());
        assert!(validate_adjustment_reason(MovementType::Adjustment, Some("  ")).is_err());
        assert!(validate_adjustment_reason(MovementType::Adjustment, Some("stock count")).is_ok());
        assert!(validate_adjustment_reason(MovementType::Purchase, None).is_ok());
    }

    #[test]
    fn test_chain_verification_accepts_consistent_history() {
        let product = ProductId::new();
        let history = vec![
            movement(product, MovementType::Purchase, dec!(10), dec!(10)),
            movement(product, MovementType::Sale, dec!(-3), dec!(7)),
            movement(product, MovementType::Adjustment, dec!(-1), dec!(6)),
            movement(product, MovementType::Return, dec!(2), dec!(8)),
        ];
        assert!(verify_chain(&history).is_ok());
    }

    #[test]
    fn test_chain_verification_flags_break() {
        let product = ProductId::new();
        let history = vec![
            movement(product, MovementType::Purchase, dec!(10), dec!(10)),
            movement(product, MovementType::Sale, dec!(-3), dec!(8)),
        ];
        let err = verify_chain(&history).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::BrokenChain { expected, found, .. }
                if expected == dec!(7) && found == dec!(8)
        ));
    }

    #[test]
    fn test_negative_running_balance_is_allowed() {
        // Overselling is recorded faithfully; diagnostics flag it later.
        let product = ProductId::new();
        let history = vec![movement(product, MovementType::Sale, dec!(-2), dec!(-2))];
        assert!(verify_chain(&history).is_ok());
    }
}
