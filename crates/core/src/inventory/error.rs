//! Inventory error types.

use rust_decimal::Decimal;
use thiserror::Error;

use kasbook_shared::types::ProductId;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Adjustments must carry a reason.
    #[error("Adjustment reason must not be empty")]
    ReasonRequired,

    /// Quantity of zero would record a no-op movement.
    #[error("Movement quantity must not be zero")]
    ZeroQuantity,

    /// The running balance chain is broken.
    #[error("Broken movement chain for product {product_id}: expected balance {expected}, found {found}")]
    BrokenChain {
        /// The affected product.
        product_id: ProductId,
        /// Balance the chain implies.
        expected: Decimal,
        /// Balance actually recorded.
        found: Decimal,
    },

    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl InventoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::ReasonRequired => "REASON_REQUIRED",
            Self::ZeroQuantity => "ZERO_QUANTITY",
            Self::BrokenChain { .. } => "BROKEN_MOVEMENT_CHAIN",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ProductNotFound(_) => 404,
            Self::ReasonRequired | Self::ZeroQuantity => 400,
            Self::BrokenChain { .. } => 422,
            Self::Storage(_) => 500,
        }
    }
}

impl From<InventoryError> for kasbook_shared::error::AppError {
    fn from(err: InventoryError) -> Self {
        match &err {
            InventoryError::ProductNotFound(_) => Self::NotFound(err.to_string()),
            InventoryError::BrokenChain { .. } => Self::BusinessRule(err.to_string()),
            InventoryError::Storage(_) => Self::Storage(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_statuses() {
        assert_eq!(InventoryError::ReasonRequired.error_code(), "REASON_REQUIRED");
        assert_eq!(InventoryError::ReasonRequired.http_status_code(), 400);
        assert_eq!(
            InventoryError::ProductNotFound(ProductId::new()).http_status_code(),
            404
        );
        assert_eq!(InventoryError::Storage("boom".into()).http_status_code(), 500);
    }
}
