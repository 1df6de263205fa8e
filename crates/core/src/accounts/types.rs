//! Account domain types and normal-balance arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use kasbook_shared::types::{AccountId, OutletId};

/// Account type classification.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease the others
/// - Credits increase liability/equity/revenue accounts, decrease the others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset account (cash, bank, receivables, inventory).
    Asset,
    /// Liability account (payables, tax payable).
    Liability,
    /// Equity account (capital, opening-balance equity).
    Equity,
    /// Revenue account (sales, services).
    Revenue,
    /// Expense account (COGS, operating expenses).
    Expense,
}

impl AccountType {
    /// Returns the side on which this account type naturally increases.
    #[must_use]
    pub const fn normal_balance(self) -> NormalBalance {
        match self {
            Self::Asset | Self::Expense => NormalBalance::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalBalance::Credit,
        }
    }

    /// Returns true for debit-normal account types (asset, expense).
    #[must_use]
    pub const fn is_debit_normal(self) -> bool {
        matches!(self.normal_balance(), NormalBalance::Debit)
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asset => write!(f, "asset"),
            Self::Liability => write!(f, "liability"),
            Self::Equity => write!(f, "equity"),
            Self::Revenue => write!(f, "revenue"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

/// The side (debit/credit) on which an account type naturally increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalBalance {
    /// Debit-normal: balance grows with debits.
    Debit,
    /// Credit-normal: balance grows with credits.
    Credit,
}

impl NormalBalance {
    /// Calculates the signed balance change for an entry.
    ///
    /// Debit-normal: `debit - credit`; credit-normal: `credit - debit`.
    #[must_use]
    pub fn signed_delta(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }
}

/// Account subtype for more specific categorization.
///
/// Drives system-account resolution and the closing pass's cash/bank,
/// discount, tax, and COGS aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountSubtype {
    /// Physical cash drawer.
    Cash,
    /// Bank account.
    Bank,
    /// Accounts receivable.
    AccountsReceivable,
    /// Accounts payable.
    AccountsPayable,
    /// Inventory asset.
    Inventory,
    /// Tax payable.
    TaxPayable,
    /// Opening-balance equity.
    OpeningBalanceEquity,
    /// Sales revenue.
    SalesRevenue,
    /// Service revenue.
    ServiceRevenue,
    /// Sales discount (contra-revenue, tracked as revenue-type).
    SalesDiscount,
    /// Cost of goods sold.
    CostOfGoodsSold,
    /// Operating expense.
    OperatingExpense,
}

/// A chart-of-accounts entry scoped to one outlet.
///
/// `current_balance` is a cached projection; the ledger entries are the
/// source of truth and diagnostics can rebuild it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// The outlet this account belongs to.
    pub outlet_id: OutletId,
    /// Account code (unique within the outlet).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Optional subtype.
    pub subtype: Option<AccountSubtype>,
    /// Opening balance on the normal side.
    pub opening_balance: Decimal,
    /// Cached balance: opening balance plus signed sum of all entries.
    pub current_balance: Decimal,
    /// Auto-provisioned accounts the system depends on.
    pub is_system: bool,
    /// Soft-delete flag; accounts are never physically deleted.
    pub is_active: bool,
}

impl Account {
    /// Returns the normal balance side for this account.
    #[must_use]
    pub const fn normal_balance(&self) -> NormalBalance {
        self.account_type.normal_balance()
    }

    /// Signed balance change this account experiences for a debit/credit pair.
    #[must_use]
    pub fn balance_delta(&self, debit: Decimal, credit: Decimal) -> Decimal {
        self.normal_balance().signed_delta(debit, credit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normal_balance_sides() {
        assert_eq!(AccountType::Asset.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Expense.normal_balance(), NormalBalance::Debit);
        assert_eq!(AccountType::Liability.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Equity.normal_balance(), NormalBalance::Credit);
        assert_eq!(AccountType::Revenue.normal_balance(), NormalBalance::Credit);
    }

    #[test]
    fn test_is_debit_normal() {
        assert!(AccountType::Asset.is_debit_normal());
        assert!(AccountType::Expense.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
        assert!(!AccountType::Equity.is_debit_normal());
        assert!(!AccountType::Revenue.is_debit_normal());
    }

    #[test]
    fn test_signed_delta_debit_normal() {
        let nb = NormalBalance::Debit;
        assert_eq!(nb.signed_delta(dec!(100), dec!(0)), dec!(100));
        assert_eq!(nb.signed_delta(dec!(0), dec!(50)), dec!(-50));
        assert_eq!(nb.signed_delta(dec!(100), dec!(30)), dec!(70));
    }

    #[test]
    fn test_signed_delta_credit_normal() {
        let nb = NormalBalance::Credit;
        assert_eq!(nb.signed_delta(dec!(0), dec!(100)), dec!(100));
        assert_eq!(nb.signed_delta(dec!(50), dec!(0)), dec!(-50));
        assert_eq!(nb.signed_delta(dec!(30), dec!(100)), dec!(70));
    }

    #[test]
    fn test_account_type_display() {
        assert_eq!(AccountType::Asset.to_string(), "asset");
        assert_eq!(AccountType::Revenue.to_string(), "revenue");
    }
}
