//! Opening-balance posting.
//!
//! Seeds the books: each account's opening balance becomes a line on its
//! normal side, and whatever residual remains is absorbed by the
//! opening-balance equity account, provisioned on first use.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use kasbook_core::accounts::{NormalBalance, SystemAccount};
use kasbook_core::ledger::{
    BalancePolicy, DocumentRef, EntrySide, PostingLine, PostingReceipt, PostingRequest,
    ReferenceType, VoucherType,
};
use kasbook_shared::activity::{ActivityEvent, ActivityLog};
use kasbook_shared::auth::AuthContext;
use kasbook_shared::error::AppError;
use kasbook_shared::types::AccountId;

use crate::engines::LedgerPostingEngine;
use crate::repositories::AccountRepository;

/// One account's opening balance.
#[derive(Debug, Clone)]
pub struct OpeningBalanceLine {
    /// The account being seeded.
    pub account_id: AccountId,
    /// Its opening balance, on the account's normal side.
    pub balance: Decimal,
}

/// Posts opening balances as one auto-balanced journal voucher.
#[derive(Clone)]
pub struct OpeningBalanceWorkflow {
    accounts: Arc<dyn AccountRepository>,
    posting: LedgerPostingEngine,
    activity: Arc<dyn ActivityLog>,
}

impl OpeningBalanceWorkflow {
    /// Creates the workflow.
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        posting: LedgerPostingEngine,
        activity: Arc<dyn ActivityLog>,
    ) -> Self {
        Self {
            accounts,
            posting,
            activity,
        }
    }

    /// Posts the opening balances for an outlet.
    ///
    /// Debit-normal accounts are debited, credit-normal accounts credited,
    /// and the residual is credited (or debited) to opening-balance equity.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] for an unknown account,
    /// [`AppError::Validation`] for negative balances or no lines, and
    /// ledger/storage errors from the posting itself.
    pub async fn post_opening_balances(
        &self,
        ctx: &AuthContext,
        date: DateTime<Utc>,
        lines: Vec<OpeningBalanceLine>,
    ) -> Result<PostingReceipt, AppError> {
        let equity = self
            .posting
            .ensure_system_account(ctx.outlet_id, SystemAccount::OpeningBalanceEquity)
            .await?;

        let mut posting_lines = Vec::with_capacity(lines.len());
        for line in lines {
            let account = self
                .accounts
                .account(line.account_id)
                .await
                .map_err(AppError::from)?
                .ok_or_else(|| AppError::NotFound(format!("account {}", line.account_id)))?;
            let side = match account.normal_balance() {
                NormalBalance::Debit => EntrySide::Debit,
                NormalBalance::Credit => EntrySide::Credit,
            };
            posting_lines.push(PostingLine {
                account_id: line.account_id,
                side,
                amount: line.balance,
            });
        }

        let request = PostingRequest {
            voucher_type: VoucherType::Journal,
            date,
            narration: "Opening balance".to_string(),
            lines: posting_lines,
            reference: DocumentRef::bare(ReferenceType::OpeningBalance),
            outlet_id: ctx.outlet_id,
            created_by: ctx.user_id,
        };
        let receipt = self
            .posting
            .post(
                request,
                BalancePolicy::AutoBalance {
                    account_id: equity.id,
                },
            )
            .await?;

        let event = ActivityEvent::now(
            ctx.user_id,
            &ctx.email,
            "CREATE",
            "ledger",
            format!("Posted opening balance voucher {}", receipt.voucher_number),
            ctx.outlet_id,
        );
        if let Err(msg) = self.activity.record(event) {
            tracing::warn!(msg, "activity log rejected opening-balance event");
        }

        Ok(receipt)
    }
}
