//! Async repository traits.
//!
//! The engines depend on these traits only, so a database-backed store can
//! replace [`crate::memory::InMemoryStore`] without touching business logic.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use kasbook_core::accounts::{Account, AccountSubtype};
use kasbook_core::closing::{Closing, ClosingStatus, ClosingType};
use kasbook_core::documents::{ExpenseDocument, PurchaseDocument, Sale, SaleReturn};
use kasbook_core::inventory::{InventoryMovement, Product};
use kasbook_core::ledger::{LedgerEntry, PostingReceipt, PreparedPosting, Voucher};
use kasbook_shared::types::{
    AccountId, ClosingId, OutletId, ProductId, SaleId, VoucherId,
};

use crate::error::StoreError;

/// Chart-of-accounts access.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fetches one account.
    async fn account(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// All accounts for an outlet.
    async fn accounts_for_outlet(&self, outlet_id: OutletId) -> Result<Vec<Account>, StoreError>;

    /// The first active account with the given subtype, if any.
    async fn account_by_subtype(
        &self,
        outlet_id: OutletId,
        subtype: AccountSubtype,
    ) -> Result<Option<Account>, StoreError>;

    /// Inserts a new account.
    async fn insert_account(&self, account: Account) -> Result<(), StoreError>;

    /// Applies a signed delta to an account's cached balance.
    async fn apply_balance_delta(
        &self,
        id: AccountId,
        delta: Decimal,
    ) -> Result<(), StoreError>;

    /// Overwrites an account's cached balance (used by rebuilds).
    async fn set_current_balance(
        &self,
        id: AccountId,
        balance: Decimal,
    ) -> Result<(), StoreError>;
}

/// Voucher persistence, including the posting unit of work.
#[async_trait]
pub trait VoucherRepository: Send + Sync {
    /// Fetches one voucher.
    async fn voucher(&self, id: VoucherId) -> Result<Option<Voucher>, StoreError>;

    /// Whether a voucher number is already taken for the outlet.
    async fn voucher_number_exists(
        &self,
        outlet_id: OutletId,
        number: &str,
    ) -> Result<bool, StoreError>;

    /// All voucher numbers for the outlet starting with `prefix`.
    async fn voucher_numbers_with_prefix(
        &self,
        outlet_id: OutletId,
        prefix: &str,
    ) -> Result<Vec<String>, StoreError>;

    /// Commits a prepared posting as one unit: voucher, ledger entries, and
    /// cached balance deltas all land or none do.
    async fn commit_posting(
        &self,
        prepared: PreparedPosting,
    ) -> Result<PostingReceipt, StoreError>;
}

/// Ledger-entry queries.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Entries belonging to a voucher.
    async fn entries_for_voucher(
        &self,
        voucher_id: VoucherId,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// All entries for an outlet.
    async fn entries_for_outlet(
        &self,
        outlet_id: OutletId,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Entries with `start <= date < end`.
    async fn entries_in_range(
        &self,
        outlet_id: OutletId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Entries with `date <= instant`.
    async fn entries_up_to(
        &self,
        outlet_id: OutletId,
        instant: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// The date of the outlet's oldest entry, if any.
    async fn earliest_entry_date(
        &self,
        outlet_id: OutletId,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;
}

/// Stock-movement persistence.
#[async_trait]
pub trait MovementRepository: Send + Sync {
    /// The most recent movement for a product, by recording time.
    async fn latest_movement(
        &self,
        product_id: ProductId,
    ) -> Result<Option<InventoryMovement>, StoreError>;

    /// A product's full movement history in chronological order.
    async fn movements_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<InventoryMovement>, StoreError>;

    /// Appends a movement and mirrors its `balance_after` onto the cached
    /// product stock, as one unit.
    async fn append_movement(&self, movement: InventoryMovement) -> Result<(), StoreError>;
}

/// Product access.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetches one product.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Inserts a new product.
    async fn insert_product(&self, product: Product) -> Result<(), StoreError>;

    /// Overwrites a product's weighted-average cost.
    async fn set_cost_price(&self, id: ProductId, cost: Decimal) -> Result<(), StoreError>;
}

/// Closing persistence.
#[async_trait]
pub trait ClosingRepository: Send + Sync {
    /// Fetches one closing.
    async fn closing(&self, id: ClosingId) -> Result<Option<Closing>, StoreError>;

    /// The most recent closing of this type dated strictly before `date`.
    async fn latest_closing_before(
        &self,
        outlet_id: OutletId,
        closing_type: ClosingType,
        date: NaiveDate,
    ) -> Result<Option<Closing>, StoreError>;

    /// The closing of this type for exactly `date`, if one exists.
    async fn closing_for_date(
        &self,
        outlet_id: OutletId,
        closing_type: ClosingType,
        date: NaiveDate,
    ) -> Result<Option<Closing>, StoreError>;

    /// Inserts a new closing.
    async fn insert_closing(&self, closing: Closing) -> Result<(), StoreError>;

    /// Updates a closing's status.
    async fn set_status(&self, id: ClosingId, status: ClosingStatus) -> Result<(), StoreError>;
}

/// Business-document persistence.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts a purchase document.
    async fn insert_purchase(&self, purchase: PurchaseDocument) -> Result<(), StoreError>;

    /// Purchases with `start <= date < end`.
    async fn purchases_in_range(
        &self,
        outlet_id: OutletId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PurchaseDocument>, StoreError>;

    /// Inserts an expense document.
    async fn insert_expense(&self, expense: ExpenseDocument) -> Result<(), StoreError>;

    /// Expenses with `start <= date < end`.
    async fn expenses_in_range(
        &self,
        outlet_id: OutletId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ExpenseDocument>, StoreError>;

    /// Fetches one sale.
    async fn sale(&self, id: SaleId) -> Result<Option<Sale>, StoreError>;

    /// Inserts a sale.
    async fn insert_sale(&self, sale: Sale) -> Result<(), StoreError>;

    /// Inserts a sale return.
    async fn insert_return(&self, sale_return: SaleReturn) -> Result<(), StoreError>;

    /// Atomically adds to a sale's returned total, re-checking the cap under
    /// the lock. Returns the updated sale.
    async fn try_add_returned_amount(
        &self,
        sale_id: SaleId,
        amount: Decimal,
    ) -> Result<Sale, StoreError>;
}

/// Everything the workflows need, in one bound.
pub trait Store:
    AccountRepository
    + VoucherRepository
    + LedgerRepository
    + MovementRepository
    + ProductRepository
    + ClosingRepository
    + DocumentRepository
{
}

impl<T> Store for T where
    T: AccountRepository
        + VoucherRepository
        + LedgerRepository
        + MovementRepository
        + ProductRepository
        + ClosingRepository
        + DocumentRepository
{
}
