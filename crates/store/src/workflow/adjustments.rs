//! Stock adjustment workflow.
//!
//! Adjustments carry a mandatory reason and post the value change between
//! inventory and cost of goods sold, so shrinkage and count corrections hit
//! the books, not just the stock ledger.

use rust_decimal::Decimal;
use validator::Validate;

use kasbook_core::accounts::SystemAccount;
use kasbook_core::inventory::{InventoryMovement, MovementType};
use kasbook_core::ledger::{
    BalancePolicy, DocumentRef, PostingLine, PostingReceipt, PostingRequest, ReferenceType,
    VoucherType,
};
use kasbook_shared::activity::{ActivityEvent, ActivityLog};
use kasbook_shared::auth::AuthContext;
use kasbook_shared::error::AppError;
use kasbook_shared::types::ProductId;

use std::sync::Arc;

use chrono::Utc;

use crate::engines::{InventoryMovementLedger, LedgerPostingEngine, MovementRecord};
use crate::repositories::ProductRepository;

use super::types::WorkflowOutcome;

/// Input for a manual stock adjustment.
#[derive(Debug, Clone, Validate)]
pub struct StockAdjustmentInput {
    /// The product being adjusted.
    pub product_id: ProductId,
    /// Signed quantity change.
    pub quantity: Decimal,
    /// Why the stock is being adjusted (mandatory).
    #[validate(length(min = 1, message = "adjustment reason must not be empty"))]
    pub reason: String,
}

/// The recorded movement and its valuation voucher, when posted.
#[derive(Debug, Clone)]
pub struct AdjustmentOutcome {
    /// The recorded movement.
    pub movement: InventoryMovement,
    /// The valuation voucher, absent when no value applied or posting
    /// failed.
    pub voucher: Option<PostingReceipt>,
}

/// Records manual stock adjustments.
#[derive(Clone)]
pub struct AdjustmentWorkflow {
    products: Arc<dyn ProductRepository>,
    movements: InventoryMovementLedger,
    posting: LedgerPostingEngine,
    activity: Arc<dyn ActivityLog>,
}

impl AdjustmentWorkflow {
    /// Creates the workflow.
    #[must_use]
    pub fn new(
        products: Arc<dyn ProductRepository>,
        movements: InventoryMovementLedger,
        posting: LedgerPostingEngine,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            products,
            movements,
            posting,
            activity,
        }
    }

    /// Records an adjustment movement and posts its valuation.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] for bad input and [`AppError::NotFound`] for
    /// an unknown product; a valuation-posting failure after the movement is
    /// recorded surfaces inside the partial outcome.
    pub async fn adjust_stock(
        &self,
        ctx: &AuthContext,
        input: StockAdjustmentInput,
    ) -> Result<WorkflowOutcome<AdjustmentOutcome>, AppError> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let product = self
            .products
            .product(input.product_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("product {}", input.product_id)))?;

        let movement = self
            .movements
            .record(MovementRecord {
                product_id: input.product_id,
                movement_type: MovementType::Adjustment,
                quantity: input.quantity,
                unit_cost: product.cost_price,
                reason: Some(input.reason.clone()),
                reference: DocumentRef::bare(ReferenceType::Adjustment),
                outlet_id: ctx.outlet_id,
                recorded_by: ctx.user_id,
            })
            .await?;

        let value = input.quantity.abs() * product.cost_price;
        let posted = if value.is_zero() {
            Ok(None)
        } else {
            self.post_valuation(ctx, &input, value).await.map(Some)
        };

        let event = ActivityEvent::now(
            ctx.user_id,
            &ctx.email,
            "ADJUST",
            "inventory",
            format!(
                "Adjusted {} by {} ({})",
                product.name, input.quantity, input.reason
            ),
            ctx.outlet_id,
        );
        if let Err(msg) = self.activity.record(event) {
            tracing::warn!(msg, "activity log rejected adjustment event");
        }

        match posted {
            Ok(voucher) => Ok(WorkflowOutcome::Complete(AdjustmentOutcome {
                movement,
                voucher,
            })),
            Err(err) => Ok(WorkflowOutcome::Partial {
                value: AdjustmentOutcome {
                    movement,
                    voucher: None,
                },
                warning: format!("valuation posting failed: {err}"),
            }),
        }
    }

    /// Gains debit inventory against COGS; losses debit COGS against
    /// inventory.
    async fn post_valuation(
        &self,
        ctx: &AuthContext,
        input: &StockAdjustmentInput,
        value: Decimal,
    ) -> Result<PostingReceipt, AppError> {
        let inventory = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::Inventory)
            .await?;
        let cogs = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::CostOfGoodsSold)
            .await?;

        let lines = if input.quantity > Decimal::ZERO {
            vec![
                PostingLine::debit(inventory.id, value),
                PostingLine::credit(cogs.id, value),
            ]
        } else {
            vec![
                PostingLine::debit(cogs.id, value),
                PostingLine::credit(inventory.id, value),
            ]
        };
        let request = PostingRequest {
            voucher_type: VoucherType::Journal,
            date: Utc::now(),
            narration: format!("Stock adjustment: {}", input.reason),
            lines,
            reference: DocumentRef::bare(ReferenceType::Adjustment),
            outlet_id: ctx.outlet_id,
            created_by: ctx.user_id,
        };
        Ok(self.posting.post(request, BalancePolicy::Strict).await?)
    }
}
