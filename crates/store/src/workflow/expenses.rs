//! Expense workflow: document first, then the ledger posting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use validator::Validate;

use kasbook_core::accounts::SystemAccount;
use kasbook_core::documents::ExpenseDocument;
use kasbook_core::ledger::{
    BalancePolicy, DocumentRef, PostingLine, PostingReceipt, PostingRequest, ReferenceType,
    VoucherType,
};
use kasbook_shared::activity::{ActivityEvent, ActivityLog};
use kasbook_shared::auth::AuthContext;
use kasbook_shared::error::AppError;
use kasbook_shared::types::{AccountId, DocumentId};

use crate::engines::{LedgerPostingEngine, VoucherNumberAllocator};
use crate::repositories::DocumentRepository;

use super::purchases::payment_status_for;
use super::types::WorkflowOutcome;

/// Input for recording an expense.
#[derive(Debug, Clone, Validate)]
pub struct ExpenseInput {
    /// Expense category label.
    #[validate(length(min = 1, message = "category must not be empty"))]
    pub category: String,
    /// The expense account to debit.
    pub expense_account_id: AccountId,
    /// Document date.
    pub date: DateTime<Utc>,
    /// Total expense amount.
    pub amount: Decimal,
    /// Amount paid now; the rest is owed.
    pub amount_paid: Decimal,
}

/// The committed expense and its voucher, when posting succeeded.
#[derive(Debug, Clone)]
pub struct ExpenseOutcome {
    /// The committed expense document.
    pub document: ExpenseDocument,
    /// The posted voucher, absent when the ledger step failed.
    pub voucher: Option<PostingReceipt>,
}

/// Records expenses end to end.
#[derive(Clone)]
pub struct ExpenseWorkflow {
    documents: Arc<dyn DocumentRepository>,
    posting: LedgerPostingEngine,
    allocator: VoucherNumberAllocator,
    activity: Arc<dyn ActivityLog>,
}

impl ExpenseWorkflow {
    /// Creates the workflow.
    #[must_use]
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        posting: LedgerPostingEngine,
        allocator: VoucherNumberAllocator,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            documents,
            posting,
            allocator,
            activity,
        }
    }

    /// Records an expense: document, then debit the expense account and
    /// credit cash/payable.
    ///
    /// # Errors
    ///
    /// [`AppError::Validation`] before the document is committed; afterwards
    /// a ledger failure surfaces inside the partial outcome.
    pub async fn record_expense(
        &self,
        ctx: &AuthContext,
        input: ExpenseInput,
    ) -> Result<WorkflowOutcome<ExpenseOutcome>, AppError> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "expense amount must be positive".to_string(),
            ));
        }

        let document_number = self
            .allocator
            .allocate(ctx.outlet_id, VoucherType::Expense, input.date.date_naive())
            .await?;
        let document = ExpenseDocument {
            id: DocumentId::new(),
            document_number: document_number.clone(),
            date: input.date,
            category: input.category.clone(),
            grand_total: input.amount,
            amount_paid: input.amount_paid,
            payment_status: payment_status_for(input.amount, input.amount_paid),
            is_reversed: false,
            outlet_id: ctx.outlet_id,
        };
        self.documents
            .insert_expense(document.clone())
            .await
            .map_err(AppError::from)?;

        let posted = self.post_ledger(ctx, &document, input.expense_account_id).await;

        let event = ActivityEvent::now(
            ctx.user_id,
            &ctx.email,
            "CREATE",
            "expenses",
            format!("Recorded expense {document_number} ({})", document.category),
            ctx.outlet_id,
        );
        if let Err(msg) = self.activity.record(event) {
            tracing::warn!(msg, "activity log rejected expense event");
        }

        match posted {
            Ok(receipt) => Ok(WorkflowOutcome::Complete(ExpenseOutcome {
                document,
                voucher: Some(receipt),
            })),
            Err(err) => Ok(WorkflowOutcome::Partial {
                value: ExpenseOutcome {
                    document,
                    voucher: None,
                },
                warning: format!("ledger posting failed: {err}"),
            }),
        }
    }

    async fn post_ledger(
        &self,
        ctx: &AuthContext,
        document: &ExpenseDocument,
        expense_account_id: AccountId,
    ) -> Result<PostingReceipt, AppError> {
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
            PostingLine::debit(expense_account_id, document.grand_total),
            PostingLine::credit(cash.id, document.amount_paid),
            PostingLine::credit(payable.id, unpaid),
        ];
        let request = PostingRequest {
            voucher_type: VoucherType::Expense,
            date: document.date,
            narration: format!("Expense: {}", document.category),
            lines,
            reference: DocumentRef {
                reference_type: ReferenceType::Expense,
                reference_id: Some(document.id.into_inner()),
                reference_number: Some(document.document_number.clone()),
            },
            outlet_id: ctx.outlet_id,
            created_by: ctx.user_id,
        };
        Ok(self.posting.post(request, BalancePolicy::Strict).await?)
    }
}
