//! The posting engine: allocates a number, prepares the posting, and commits
//! voucher, entries and balance deltas as one unit.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

use kasbook_core::accounts::{Account, SystemAccount};
use kasbook_core::ledger::{
    BalancePolicy, LedgerError, PostingReceipt, PostingRequest, prepare_posting,
};
use kasbook_shared::types::{AccountId, OutletId};

use crate::repositories::{AccountRepository, VoucherRepository};

use super::numbering::VoucherNumberAllocator;

/// Posts balanced vouchers to the ledger.
#[derive(Clone)]
pub struct LedgerPostingEngine {
    accounts: Arc<dyn AccountRepository>,
    vouchers: Arc<dyn VoucherRepository>,
    allocator: VoucherNumberAllocator,
}

impl LedgerPostingEngine {
    /// Creates a posting engine over the account and voucher repositories.
    #[must_use]
    pub fn new(accounts: Arc<dyn AccountRepository>, vouchers: Arc<dyn VoucherRepository>) -> Self {
        let allocator = VoucherNumberAllocator::new(Arc::clone(&vouchers));
        Self {
            accounts,
            vouchers,
            allocator,
        }
    }

    /// Resolves a system account, provisioning it on first use.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Storage`] when the repository fails.
    pub async fn ensure_system_account(
        &self,
        outlet_id: OutletId,
        kind: SystemAccount,
    ) -> Result<Account, LedgerError> {
        if let Some(account) = self
            .accounts
            .account_by_subtype(outlet_id, kind.subtype())
            .await?
        {
            return Ok(account);
        }

        let spec = kind.spec();
        let account = Account {
            id: AccountId::new(),
            outlet_id,
            code: spec.code.to_string(),
            name: spec.name.to_string(),
            account_type: spec.account_type,
            subtype: Some(spec.subtype),
            opening_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            is_system: true,
            is_active: true,
        };
        tracing::info!(%outlet_id, code = spec.code, "provisioning system account");
        self.accounts.insert_account(account.clone()).await?;
        Ok(account)
    }

    /// Posts a voucher: allocate number, validate and prepare, commit.
    ///
    /// # Errors
    ///
    /// Any [`LedgerError`] from validation, plus [`LedgerError::Storage`] on
    /// repository failure.
    pub async fn post(
        &self,
        request: PostingRequest,
        policy: BalancePolicy,
    ) -> Result<PostingReceipt, LedgerError> {
        let voucher_number = self
            .allocator
            .allocate(
                request.outlet_id,
                request.voucher_type,
                request.date.date_naive(),
            )
            .await?;

        let mut account_ids: Vec<AccountId> =
            request.lines.iter().map(|line| line.account_id).collect();
        if let BalancePolicy::AutoBalance { account_id } = policy {
            account_ids.push(account_id);
        }

        let mut accounts = HashMap::with_capacity(account_ids.len());
        for id in account_ids {
            let account = self
                .accounts
                .account(id)
                .await?
                .ok_or(LedgerError::AccountNotFound(id))?;
            accounts.insert(id, account);
        }

        let prepared = prepare_posting(request, voucher_number, &accounts, policy)?;
        let receipt = self.vouchers.commit_posting(prepared).await?;
        tracing::info!(voucher_number = %receipt.voucher_number, "posted voucher");
        Ok(receipt)
    }
}
