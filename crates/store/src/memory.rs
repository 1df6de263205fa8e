//! Thread-safe in-memory store.
//!
//! Backs every repository trait with concurrent maps. Used directly in tests
//! and as the reference implementation for the commit semantics a
//! database-backed store must honor: `commit_posting`,
//! `append_movement` and `try_add_returned_amount` are each one unit of
//! work.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

use kasbook_core::accounts::{Account, AccountSubtype};
use kasbook_core::closing::{Closing, ClosingStatus, ClosingType};
use kasbook_core::documents::{ExpenseDocument, PurchaseDocument, Sale, SaleReturn};
use kasbook_core::inventory::{InventoryMovement, Product};
use kasbook_core::ledger::{LedgerEntry, PostingReceipt, PreparedPosting, Voucher};
use kasbook_shared::types::{
    AccountId, ClosingId, DocumentId, LedgerEntryId, OutletId, ProductId, SaleId, VoucherId,
};

use crate::error::StoreError;
use crate::repositories::{
    AccountRepository, ClosingRepository, DocumentRepository, LedgerRepository,
    MovementRepository, ProductRepository, VoucherRepository,
};

/// In-memory implementation of every repository trait.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    accounts: DashMap<AccountId, Account>,
    vouchers: DashMap<VoucherId, Voucher>,
    entries: DashMap<LedgerEntryId, LedgerEntry>,
    movements: DashMap<ProductId, Vec<InventoryMovement>>,
    products: DashMap<ProductId, Product>,
    closings: DashMap<ClosingId, Closing>,
    purchases: DashMap<DocumentId, PurchaseDocument>,
    expenses: DashMap<DocumentId, ExpenseDocument>,
    sales: DashMap<SaleId, Sale>,
    returns: DashMap<DocumentId, SaleReturn>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn accounts_for_outlet(&self, outlet_id: OutletId) -> Result<Vec<Account>, StoreError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter(|a| a.outlet_id == outlet_id)
            .map(|a| a.clone())
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn account_by_subtype(
        &self,
        outlet_id: OutletId,
        subtype: AccountSubtype,
    ) -> Result<Option<Account>, StoreError> {
        Ok(self
            .accounts
            .iter()
            .find(|a| a.outlet_id == outlet_id && a.is_active && a.subtype == Some(subtype))
            .map(|a| a.clone()))
    }

    async fn insert_account(&self, account: Account) -> Result<(), StoreError> {
        self.accounts.insert(account.id, account);
        Ok(())
    }

    async fn apply_balance_delta(
        &self,
        id: AccountId,
        delta: Decimal,
    ) -> Result<(), StoreError> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        account.current_balance += delta;
        Ok(())
    }

    async fn set_current_balance(
        &self,
        id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError> {
        let mut account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {id}")))?;
        account.current_balance = balance;
        Ok(())
    }
}

#[async_trait]
impl VoucherRepository for InMemoryStore {
    async fn voucher(&self, id: VoucherId) -> Result<Option<Voucher>, StoreError> {
        Ok(self.vouchers.get(&id).map(|v| v.clone()))
    }

    async fn voucher_number_exists(
        &self,
        outlet_id: OutletId,
        number: &str,
    ) -> Result<bool, StoreError> {
        Ok(self
            .vouchers
            .iter()
            .any(|v| v.outlet_id == outlet_id && v.voucher_number == number))
    }

    async fn voucher_numbers_with_prefix(
        &self,
        outlet_id: OutletId,
        prefix: &str,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .vouchers
            .iter()
            .filter(|v| v.outlet_id == outlet_id && v.voucher_number.starts_with(prefix))
            .map(|v| v.voucher_number.clone())
            .collect())
    }

    async fn commit_posting(
        &self,
        prepared: PreparedPosting,
    ) -> Result<PostingReceipt, StoreError> {
        let voucher = prepared.voucher;
        if self
            .voucher_number_exists(voucher.outlet_id, &voucher.voucher_number)
            .await?
        {
            return Err(StoreError::Conflict(format!(
                "voucher number {} already exists",
                voucher.voucher_number
            )));
        }

        // Validate every touched account up front so a missing one cannot
        // leave a half-applied posting behind.
        for delta in &prepared.balance_deltas {
            if !self.accounts.contains_key(&delta.account_id) {
                return Err(StoreError::NotFound(format!(
                    "account {}",
                    delta.account_id
                )));
            }
        }

        let receipt = PostingReceipt {
            voucher_id: voucher.id,
            voucher_number: voucher.voucher_number.clone(),
        };
        self.vouchers.insert(voucher.id, voucher);
        for entry in prepared.entries {
            self.entries.insert(entry.id, entry);
        }
        for delta in prepared.balance_deltas {
            self.apply_balance_delta(delta.account_id, delta.delta).await?;
        }
        Ok(receipt)
    }
}

#[async_trait]
impl LedgerRepository for InMemoryStore {
    async fn entries_for_voucher(
        &self,
        voucher_id: VoucherId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.voucher_id == voucher_id)
            .map(|e| e.clone())
            .collect())
    }

    async fn entries_for_outlet(
        &self,
        outlet_id: OutletId,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.outlet_id == outlet_id)
            .map(|e| e.clone())
            .collect())
    }

    async fn entries_in_range(
        &self,
        outlet_id: OutletId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.outlet_id == outlet_id && e.date >= start && e.date < end)
            .map(|e| e.clone())
            .collect())
    }

    async fn entries_up_to(
        &self,
        outlet_id: OutletId,
        instant: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.outlet_id == outlet_id && e.date <= instant)
            .map(|e| e.clone())
            .collect())
    }

    async fn earliest_entry_date(
        &self,
        outlet_id: OutletId,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.outlet_id == outlet_id)
            .map(|e| e.date)
            .min())
    }
}

#[async_trait]
impl MovementRepository for InMemoryStore {
    async fn latest_movement(
        &self,
        product_id: ProductId,
    ) -> Result<Option<InventoryMovement>, StoreError> {
        // Histories are append-only in recording order, so the vector tail
        // is the newest movement. `balance_after` chaining depends on this;
        // out-of-order backfills must not go through `append_movement`.
        Ok(self
            .movements
            .get(&product_id)
            .and_then(|history| history.last().cloned()))
    }

    async fn movements_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<InventoryMovement>, StoreError> {
        Ok(self
            .movements
            .get(&product_id)
            .map(|history| history.clone())
            .unwrap_or_default())
    }

    async fn append_movement(&self, movement: InventoryMovement) -> Result<(), StoreError> {
        let mut product = self
            .products
            .get_mut(&movement.product_id)
            .ok_or_else(|| StoreError::NotFound(format!("product {}", movement.product_id)))?;
        product.stock = movement.balance_after;
        self.movements
            .entry(movement.product_id)
            .or_default()
            .push(movement);
        Ok(())
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.products.get(&id).map(|p| p.clone()))
    }

    async fn insert_product(&self, product: Product) -> Result<(), StoreError> {
        self.products.insert(product.id, product);
        Ok(())
    }

    async fn set_cost_price(&self, id: ProductId, cost: Decimal) -> Result<(), StoreError> {
        let mut product = self
            .products
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("product {id}")))?;
        product.cost_price = cost;
        Ok(())
    }
}

#[async_trait]
impl ClosingRepository for InMemoryStore {
    async fn closing(&self, id: ClosingId) -> Result<Option<Closing>, StoreError> {
        Ok(self.closings.get(&id).map(|c| c.clone()))
    }

    async fn latest_closing_before(
        &self,
        outlet_id: OutletId,
        closing_type: ClosingType,
        date: NaiveDate,
    ) -> Result<Option<Closing>, StoreError> {
        Ok(self
            .closings
            .iter()
            .filter(|c| {
                c.outlet_id == outlet_id
                    && c.closing_type == closing_type
                    && c.closing_date < date
            })
            .max_by_key(|c| c.closing_date)
            .map(|c| c.clone()))
    }

    async fn closing_for_date(
        &self,
        outlet_id: OutletId,
        closing_type: ClosingType,
        date: NaiveDate,
    ) -> Result<Option<Closing>, StoreError> {
        Ok(self
            .closings
            .iter()
            .find(|c| {
                c.outlet_id == outlet_id
                    && c.closing_type == closing_type
                    && c.closing_date == date
            })
            .map(|c| c.clone()))
    }

    async fn insert_closing(&self, closing: Closing) -> Result<(), StoreError> {
        self.closings.insert(closing.id, closing);
        Ok(())
    }

    async fn set_status(&self, id: ClosingId, status: ClosingStatus) -> Result<(), StoreError> {
        let mut closing = self
            .closings
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("closing {id}")))?;
        closing.status = status;
        Ok(())
    }
}

#[async_trait]
impl DocumentRepository for InMemoryStore {
    async fn insert_purchase(&self, purchase: PurchaseDocument) -> Result<(), StoreError> {
        self.purchases.insert(purchase.id, purchase);
        Ok(())
    }

    async fn purchases_in_range(
        &self,
        outlet_id: OutletId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PurchaseDocument>, StoreError> {
        Ok(self
            .purchases
            .iter()
            .filter(|p| p.outlet_id == outlet_id && p.date >= start && p.date < end)
            .map(|p| p.clone())
            .collect())
    }

    async fn insert_expense(&self, expense: ExpenseDocument) -> Result<(), StoreError> {
        self.expenses.insert(expense.id, expense);
        Ok(())
    }

    async fn expenses_in_range(
        &self,
        outlet_id: OutletId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExpenseDocument>, StoreError> {
        Ok(self
            .expenses
            .iter()
            .filter(|e| e.outlet_id == outlet_id && e.date >= start && e.date < end)
            .map(|e| e.clone())
            .collect())
    }

    async fn sale(&self, id: SaleId) -> Result<Option<Sale>, StoreError> {
        Ok(self.sales.get(&id).map(|s| s.clone()))
    }

    async fn insert_sale(&self, sale: Sale) -> Result<(), StoreError> {
        self.sales.insert(sale.id, sale);
        Ok(())
    }

    async fn insert_return(&self, sale_return: SaleReturn) -> Result<(), StoreError> {
        self.returns.insert(sale_return.id, sale_return);
        Ok(())
    }

    async fn try_add_returned_amount(
        &self,
        sale_id: SaleId,
        amount: Decimal,
    ) -> Result<Sale, StoreError> {
        let mut sale = self
            .sales
            .get_mut(&sale_id)
            .ok_or_else(|| StoreError::NotFound(format!("sale {sale_id}")))?;
        // Re-check under the entry lock so concurrent returns cannot
        // overshoot the cap together.
        let available = sale.grand_total - sale.total_returned_amount;
        if amount > available {
            return Err(StoreError::Conflict(format!(
                "return of {amount} exceeds returnable amount {available}"
            )));
        }
        sale.total_returned_amount += amount;
        Ok(sale.clone())
    }
}
