//! Sales and sale-return workflows.
//!
//! A sale writes its document, the revenue/discount/tax/cash posting, the
//! COGS posting at weighted-average cost, and one outbound movement per
//! item. A return is capped at what the sale has not already refunded; the
//! cap is enforced atomically on the sale record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use kasbook_core::accounts::SystemAccount;
use kasbook_core::documents::{Sale, SaleReturn, validate_return_amount};
use kasbook_core::inventory::MovementType;
use kasbook_core::ledger::{
    BalancePolicy, DocumentRef, PostingLine, PostingReceipt, PostingRequest, ReferenceType,
    VoucherType,
};
use kasbook_shared::activity::{ActivityEvent, ActivityLog};
use kasbook_shared::auth::AuthContext;
use kasbook_shared::error::AppError;
use kasbook_shared::types::{DocumentId, ProductId, SaleId};

use crate::engines::{
    InventoryMovementLedger, LedgerPostingEngine, MovementRecord, VoucherNumberAllocator,
};
use crate::error::StoreError;
use crate::repositories::{DocumentRepository, ProductRepository};

use super::purchases::payment_status_for;
use super::types::WorkflowOutcome;

/// One sold product line.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SaleItemInput {
    /// The product sold.
    pub product_id: ProductId,
    /// Units sold (positive).
    pub quantity: Decimal,
    /// Selling price per unit.
    pub unit_price: Decimal,
}

/// Input for recording a sale.
#[derive(Debug, Clone, Validate)]
pub struct SaleInput {
    /// Sale date.
    pub date: DateTime<Utc>,
    /// The sold items.
    #[validate(length(min = 1, message = "a sale needs at least one item"))]
    pub items: Vec<SaleItemInput>,
    /// Discount off the item subtotal.
    pub discount: Decimal,
    /// Tax added on top.
    pub tax: Decimal,
    /// Amount the customer paid now.
    pub amount_paid: Decimal,
}

/// Input for recording a return against a sale.
#[derive(Debug, Clone, Validate)]
pub struct SaleReturnInput {
    /// The sale being returned against.
    pub sale_id: SaleId,
    /// Amount to refund.
    pub amount: Decimal,
    /// Why the goods came back.
    #[validate(length(min = 1, message = "return reason must not be empty"))]
    pub reason: String,
    /// Items coming back to stock, if any.
    pub items: Vec<SaleItemInput>,
}

/// The committed sale and its vouchers, where posted.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    /// The committed sale.
    pub sale: Sale,
    /// The revenue voucher, absent when that step failed.
    pub revenue_voucher: Option<PostingReceipt>,
    /// The COGS voucher, absent when that step failed or no cost applied.
    pub cogs_voucher: Option<PostingReceipt>,
}

/// The committed return and its voucher, when posted.
#[derive(Debug, Clone)]
pub struct SaleReturnOutcome {
    /// The committed return document.
    pub sale_return: SaleReturn,
    /// The refund voucher, absent when that step failed.
    pub voucher: Option<PostingReceipt>,
}

/// Records sales and returns end to end.
#[derive(Clone)]
pub struct SalesWorkflow {
    documents: Arc<dyn DocumentRepository>,
    products: Arc<dyn ProductRepository>,
    posting: LedgerPostingEngine,
    allocator: VoucherNumberAllocator,
    movements: InventoryMovementLedger,
    activity: Arc<dyn ActivityLog>,
}

impl SalesWorkflow {
    /// Creates the workflow.
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        products: Arc<dyn ProductRepository>,
        posting: LedgerPostingEngine,
        allocator: VoucherNumberAllocator,
        movements: InventoryMovementLedger,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            documents,
            products,
            posting,
            allocator,
            movements,
            activity,
        }
    }

    /// Records a sale.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] before the sale is committed; afterwards
    /// failures surface inside the partial outcome.
    pub async fn record_sale(
        &self,
        ctx: &AuthContext,
        input: SaleInput,
    ) -> Result<WorkflowOutcome<SaleOutcome>, AppError> {
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
        if input.discount < Decimal::ZERO || input.tax < Decimal::ZERO {
            return Err(AppError::Validation(
                "discount and tax must be non-negative".to_string(),
            ));
        }

        let subtotal: Decimal = input
            .items
            .iter()
            .map(|item| item.quantity * item.unit_price)
            .sum();
        let grand_total = subtotal - input.discount + input.tax;

        let sale_number = self
            .allocator
            .allocate(ctx.outlet_id, VoucherType::Sale, input.date.date_naive())
            .await?;
        let sale = Sale {
            id: SaleId::new(),
            sale_number: sale_number.clone(),
            date: input.date,
            grand_total,
            total_discount: input.discount,
            total_tax: input.tax,
            total_returned_amount: Decimal::ZERO,
            amount_paid: input.amount_paid,
            payment_status: payment_status_for(grand_total, input.amount_paid),
            outlet_id: ctx.outlet_id,
        };
        self.documents
            .insert_sale(sale.clone())
            .await
            .map_err(AppError::from)?;

        let mut warnings = Vec::new();

        let revenue_voucher = match self.post_revenue(ctx, &sale, subtotal).await {
            Ok(receipt) => Some(receipt),
            Err(err) => {
                warnings.push(format!("revenue posting failed: {err}"));
                None
            }
        };
        let cogs_voucher = match self.post_cogs_and_stock(ctx, &sale, &input.items).await {
            Ok(receipt) => receipt,
            Err(err) => {
                warnings.push(format!("COGS posting failed: {err}"));
                None
            }
        };

        let event = ActivityEvent::now(
            ctx.user_id,
            &ctx.email,
            "CREATE",
            "sales",
            format!("Recorded sale {sale_number}"),
            ctx.outlet_id,
        );
        if let Err(msg) = self.activity.record(event) {
            tracing::warn!(msg, "activity log rejected sale event");
        }

        let outcome = SaleOutcome {
            sale,
            revenue_voucher,
            cogs_voucher,
        };
        if warnings.is_empty() {
            Ok(WorkflowOutcome::Complete(outcome))
        } else {
            Ok(WorkflowOutcome::Partial {
                value: outcome,
                warning: warnings.join("; "),
            })
        }
    }

    /// Records a return against a sale, capped at what is still returnable.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] for an unknown sale,
    /// [`AppError::BusinessRule`] when the cap would be exceeded (the sale
    /// is left untouched), and [`AppError::Validation`] for bad input.
    pub async fn record_return(
        &self,
        ctx: &AuthContext,
        input: SaleReturnInput,
    ) -> Result<WorkflowOutcome<SaleReturnOutcome>, AppError> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let sale = self
            .documents
            .sale(input.sale_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("sale {}", input.sale_id)))?;
        validate_return_amount(&sale, input.amount)?;

        // Atomic cap re-check: a concurrent return cannot push the total
        // past the cap between our check and this update.
        match self
            .documents
            .try_add_returned_amount(input.sale_id, input.amount)
            .await
        {
            Ok(_) => {}
            Err(StoreError::Conflict(msg)) => return Err(AppError::BusinessRule(msg)),
            Err(err) => return Err(err.into()),
        }

        let return_number = self
            .allocator
            .allocate(ctx.outlet_id, VoucherType::Return, Utc::now().date_naive())
            .await?;
        let sale_return = SaleReturn {
            id: DocumentId::new(),
            sale_id: input.sale_id,
            return_number: return_number.clone(),
            date: Utc::now(),
            amount: input.amount,
            reason: input.reason.clone(),
            outlet_id: ctx.outlet_id,
        };
        self.documents
            .insert_return(sale_return.clone())
            .await
            .map_err(AppError::from)?;

        let mut warnings = Vec::new();

        let voucher = match self.post_refund(ctx, &sale, &sale_return).await {
            Ok(receipt) => Some(receipt),
            Err(err) => {
                warnings.push(format!("refund posting failed: {err}"));
                None
            }
        };

        for item in &input.items {
            let unit_cost = match self.products.product(item.product_id).await {
                Ok(Some(product)) => product.cost_price,
                _ => Decimal::ZERO,
            };
            let record = MovementRecord {
                product_id: item.product_id,
                movement_type: MovementType::Return,
                quantity: item.quantity,
                unit_cost,
                reason: Some(input.reason.clone()),
                reference: DocumentRef {
                    reference_type: ReferenceType::Return,
                    reference_id: Some(sale_return.id.into_inner()),
                    reference_number: Some(return_number.clone()),
                },
                outlet_id: ctx.outlet_id,
                recorded_by: ctx.user_id,
            };
            if let Err(err) = self.movements.record(record).await {
                warnings.push(format!("stock return failed for {}: {err}", item.product_id));
            }
        }

        let event = ActivityEvent::now(
            ctx.user_id,
            &ctx.email,
            "CREATE",
            "sales",
            format!("Recorded return {return_number} against {}", sale.sale_number),
            ctx.outlet_id,
        );
        if let Err(msg) = self.activity.record(event) {
            tracing::warn!(msg, "activity log rejected return event");
        }

        let outcome = SaleReturnOutcome {
            sale_return,
            voucher,
        };
        if warnings.is_empty() {
            Ok(WorkflowOutcome::Complete(outcome))
        } else {
            Ok(WorkflowOutcome::Partial {
                value: outcome,
                warning: warnings.join("; "),
            })
        }
    }

    /// Debit cash/receivable, debit discount, credit revenue and tax.
    async fn post_revenue(
        &self,
        ctx: &AuthContext,
        sale: &Sale,
        subtotal: Decimal,
    ) -> Result<PostingReceipt, AppError> {
        let cash = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::Cash)
            .await?;
        let receivable = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::AccountsReceivable)
            .await?;
        let revenue = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::SalesRevenue)
            .await?;
        let discount = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::SalesDiscount)
            .await?;
        let tax = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::TaxPayable)
            .await?;

        let outstanding = sale.grand_total - sale.amount_paid;
        let lines = vec![
            PostingLine::debit(cash.id, sale.amount_paid),
            PostingLine::debit(receivable.id, outstanding),
            PostingLine::debit(discount.id, sale.total_discount),
            PostingLine::credit(revenue.id, subtotal),
            PostingLine::credit(tax.id, sale.total_tax),
        ];
        let request = PostingRequest {
            voucher_type: VoucherType::Sale,
            date: sale.date,
            narration: format!("Sale {}", sale.sale_number),
            lines,
            reference: DocumentRef {
                reference_type: ReferenceType::Sale,
                reference_id: Some(sale.id.into_inner()),
                reference_number: Some(sale.sale_number.clone()),
            },
            outlet_id: ctx.outlet_id,
            created_by: ctx.user_id,
        };
        Ok(self.posting.post(request, BalancePolicy::Strict).await?)
    }

    /// Debit COGS and credit inventory at weighted-average cost, recording
    /// one outbound movement per item.
    async fn post_cogs_and_stock(
        &self,
        ctx: &AuthContext,
        sale: &Sale,
        items: &[SaleItemInput],
    ) -> Result<Option<PostingReceipt>, AppError> {
        let mut total_cost = Decimal::ZERO;
        let mut costed_items = Vec::with_capacity(items.len());
        for item in items {
            let product = self
                .products
                .product(item.product_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound(format!("product {}", item.product_id)))?;
            total_cost += item.quantity * product.cost_price;
            costed_items.push((item, product.cost_price));
        }

        for (item, unit_cost) in &costed_items {
            self.movements
                .record(MovementRecord {
                    product_id: item.product_id,
                    movement_type: MovementType::Sale,
                    quantity: -item.quantity,
                    unit_cost: *unit_cost,
                    reason: None,
                    reference: DocumentRef {
                        reference_type: ReferenceType::Sale,
                        reference_id: Some(sale.id.into_inner()),
                        reference_number: Some(sale.sale_number.clone()),
                    },
                    outlet_id: ctx.outlet_id,
                    recorded_by: ctx.user_id,
                })
                .await?;
        }

        if total_cost.is_zero() {
            return Ok(None);
        }

        let cogs = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::CostOfGoodsSold)
            .await?;
        let inventory = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::Inventory)
            .await?;
        let request = PostingRequest {
            voucher_type: VoucherType::Sale,
            date: sale.date,
            narration: format!("COGS for sale {}", sale.sale_number),
            lines: vec![
                PostingLine::debit(cogs.id, total_cost),
                PostingLine::credit(inventory.id, total_cost),
            ],
            reference: DocumentRef {
                reference_type: ReferenceType::Sale,
                reference_id: Some(sale.id.into_inner()),
                reference_number: Some(sale.sale_number.clone()),
            },
            outlet_id: ctx.outlet_id,
            created_by: ctx.user_id,
        };
        Ok(Some(
            self.posting.post(request, BalancePolicy::Strict).await?,
        ))
    }

    /// Debit revenue and the refund's tax share back, credit cash.
    async fn post_refund(
        &self,
        ctx: &AuthContext,
        sale: &Sale,
        sale_return: &SaleReturn,
    ) -> Result<PostingReceipt, AppError> {
        let cash = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::Cash)
            .await?;
        let revenue = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::SalesRevenue)
            .await?;
        let tax = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::TaxPayable)
            .await?;

        // The refund carries tax in the same proportion as the sale did; a
        // full return takes the whole liability back out.
        let tax_portion = if sale.total_tax.is_zero() || sale.grand_total.is_zero() {
            Decimal::ZERO
        } else {
            (sale_return.amount * sale.total_tax / sale.grand_total).round_dp(2)
        };

        let request = PostingRequest {
            voucher_type: VoucherType::Return,
            date: sale_return.date,
            narration: format!(
                "Return {} against sale {}: {}",
                sale_return.return_number, sale.sale_number, sale_return.reason
            ),
            lines: vec![
                PostingLine::debit(revenue.id, sale_return.amount - tax_portion),
                PostingLine::debit(tax.id, tax_portion),
                PostingLine::credit(cash.id, sale_return.amount),
            ],
            reference: DocumentRef {
                reference_type: ReferenceType::Return,
                reference_id: Some(sale_return.id.into_inner()),
                reference_number: Some(sale_return.return_number.clone()),
            },
            outlet_id: ctx.outlet_id,
            created_by: ctx.user_id,
        };
        Ok(self.posting.post(request, BalancePolicy::Strict).await?)
    }
}
