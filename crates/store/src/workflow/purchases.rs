//! Purchase workflow: document, ledger posting, stock and cost updates.
//!
//! The document commits first. Every later step that fails downgrades the
//! response to a partial outcome instead of erroring, so the purchase itself
//! is never lost.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use kasbook_core::accounts::SystemAccount;
use kasbook_core::documents::{PaymentStatus, PurchaseDocument};
use kasbook_core::inventory::MovementType;
use kasbook_core::ledger::{
    BalancePolicy, DocumentRef, PostingLine, PostingReceipt, PostingRequest, ReferenceType,
    VoucherType,
};
use kasbook_shared::activity::{ActivityEvent, ActivityLog};
use kasbook_shared::auth::AuthContext;
use kasbook_shared::error::AppError;
use kasbook_shared::types::{DocumentId, ProductId};

use crate::engines::{
    InventoryMovementLedger, LedgerPostingEngine, MovementRecord, VoucherNumberAllocator,
    WeightedAverageCostEngine,
};
use crate::repositories::DocumentRepository;

use super::types::WorkflowOutcome;

/// One purchased product line.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PurchaseItemInput {
    /// The product received.
    pub product_id: ProductId,
    /// Units received (positive).
    pub quantity: Decimal,
    /// Purchase price per unit.
    pub unit_price: Decimal,
}

/// Input for recording a purchase.
#[derive(Debug, Clone, Validate)]
pub struct PurchaseInput {
    /// Supplier name.
    #[validate(length(min = 1, message = "supplier name must not be empty"))]
    pub supplier_name: String,
    /// Document date.
    pub date: DateTime<Utc>,
    /// Amount paid now; the rest is owed to the supplier.
    pub amount_paid: Decimal,
    /// The purchased items.
    #[validate(length(min = 1, message = "a purchase needs at least one item"))]
    pub items: Vec<PurchaseItemInput>,
}

/// The committed purchase and its ledger voucher, when posting succeeded.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    /// The committed purchase document.
    pub document: PurchaseDocument,
    /// The posted voucher, absent when the ledger step failed.
    pub voucher: Option<PostingReceipt>,
}

/// Records purchases end to end.
#[derive(Clone)]
pub struct PurchaseWorkflow {
    documents: Arc<dyn DocumentRepository>,
    posting: LedgerPostingEngine,
    allocator: VoucherNumberAllocator,
    movements: InventoryMovementLedger,
    costing: WeightedAverageCostEngine,
    activity: Arc<dyn ActivityLog>,
}

impl PurchaseWorkflow {
    /// Creates the workflow.
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        posting: LedgerPostingEngine,
        allocator: VoucherNumberAllocator,
        movements: InventoryMovementLedger,
        costing: WeightedAverageCostEngine,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            documents,
            posting,
            allocator,
            movements,
            costing,
            activity,
        }
    }

    /// Records a purchase: document, then inventory/cash/payable posting,
    /// then per-item cost and stock updates.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] before the document is committed; afterwards
    /// failures surface inside the partial outcome, never as errors.
    pub async fn record_purchase(
        &self,
        ctx: &AuthContext,
        input: PurchaseInput,
    ) -> Result<WorkflowOutcome<PurchaseOutcome>, AppError> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        for item in &input.items {
            if item.quantity <= Decimal::ZERO || item.unit_price < Decimal::ZERO {
                return Err(AppError::Validation(
                    "item quantity must be positive and price non-negative".to_string(),
                ));
            }
        }

        let grand_total: Decimal = input
            .items
            .iter()
            .map(|item| item.quantity * item.unit_price)
            .sum();
        let payment_status = payment_status_for(grand_total, input.amount_paid);

        let document_number = self
            .allocator
            .allocate(ctx.outlet_id, VoucherType::Purchase, input.date.date_naive())
            .await?;
        let document = PurchaseDocument {
            id: DocumentId::new(),
            document_number: document_number.clone(),
            date: input.date,
            supplier_name: input.supplier_name.clone(),
            grand_total,
            amount_paid: input.amount_paid,
            payment_status,
            is_reversed: false,
            outlet_id: ctx.outlet_id,
        };
        self.documents
            .insert_purchase(document.clone())
            .await
            .map_err(AppError::from)?;

        // Document is committed; everything from here degrades to Partial.
        let mut warnings = Vec::new();

        let voucher = match self.post_ledger(ctx, &document).await {
            Ok(receipt) => Some(receipt),
            Err(err) => {
                warnings.push(format!("ledger posting failed: {err}"));
                None
            }
        };

        for item in &input.items {
            if let Err(err) = self.receive_stock(ctx, &document, item).await {
                warnings.push(format!("stock update failed for {}: {err}", item.product_id));
            }
        }

        let event = ActivityEvent::now(
            ctx.user_id,
            &ctx.email,
            "CREATE",
            "purchases",
            format!("Recorded purchase {document_number}"),
            ctx.outlet_id,
        );
        if let Err(msg) = self.activity.record(event) {
            tracing::warn!(msg, "activity log rejected purchase event");
        }

        let outcome = PurchaseOutcome { document, voucher };
        if warnings.is_empty() {
            Ok(WorkflowOutcome::Complete(outcome))
        } else {
            Ok(WorkflowOutcome::Partial {
                value: outcome,
                warning: warnings.join("; "),
            })
        }
    }

    /// Debit inventory for the goods, credit cash for the paid portion and
    /// accounts payable for the remainder.
    async fn post_ledger(
        &self,
        ctx: &AuthContext,
        document: &PurchaseDocument,
    ) -> Result<PostingReceipt, AppError> {
        let inventory = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::Inventory)
            .await?;
        let cash = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::Cash)
            .await?;
        let payable = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::AccountsPayable)
            .await?;

        let unpaid = document.grand_total - document.amount_paid;
        let lines = vec![
            PostingLine::debit(inventory.id, document.grand_total),
            PostingLine::credit(cash.id, document.amount_paid),
            PostingLine::credit(payable.id, unpaid),
        ];
        let request = PostingRequest {
            voucher_type: VoucherType::Purchase,
            date: document.date,
            narration: format!("Purchase from {}", document.supplier_name),
            lines,
            reference: DocumentRef {
                reference_type: ReferenceType::Purchase,
                reference_id: Some(document.id.into_inner()),
                reference_number: Some(document.document_number.clone()),
            },
            outlet_id: ctx.outlet_id,
            created_by: ctx.user_id,
        };
        Ok(self.posting.post(request, BalancePolicy::Strict).await?)
    }

    /// Cost must blend before the movement lands, since the blend reads the
    /// pre-receipt stock level.
    async fn receive_stock(
        &self,
        ctx: &AuthContext,
        document: &PurchaseDocument,
        item: &PurchaseItemInput,
    ) -> Result<(), AppError> {
        self.costing
            .update_cost(item.product_id, item.quantity, item.unit_price)
            .await?;
        self.movements
            .record(MovementRecord {
                product_id: item.product_id,
                movement_type: MovementType::Purchase,
                quantity: item.quantity,
                unit_cost: item.unit_price,
                reason: None,
                reference: DocumentRef {
                    reference_type: ReferenceType::Purchase,
                    reference_id: Some(document.id.into_inner()),
                    reference_number: Some(document.document_number.clone()),
                },
                outlet_id: ctx.outlet_id,
                recorded_by: ctx.user_id,
            })
            .await?;
        Ok(())
    }
}

/// Derives the payment status from totals.
#[must_use]
pub(crate) fn payment_status_for(grand_total: Decimal, amount_paid: Decimal) -> PaymentStatus {
    if amount_paid >= grand_total {
        PaymentStatus::Paid
    } else if amount_paid.is_zero() {
        PaymentStatus::Unpaid
    } else {
        PaymentStatus::Partial
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_status_derivation() {
        assert_eq!(payment_status_for(dec!(100), dec!(100)), PaymentStatus::Paid);
        assert_eq!(payment_status_for(dec!(100), dec!(40)), PaymentStatus::Partial);
        assert_eq!(
            payment_status_for(dec!(100), Decimal::ZERO),
            PaymentStatus::Unpaid
        );
    }
}
