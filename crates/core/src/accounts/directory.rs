//! Account classification and system-account templates.
//!
//! The pure half of the account directory: classifying accounts by type and
//! describing the system accounts every outlet must carry. The store layer
//! resolves or lazily provisions these against the repository.

use once_cell::sync::Lazy;

use super::types::{Account, AccountSubtype, AccountType, NormalBalance};

/// Classifies an account by its type.
///
/// Pure function of `account.account_type`: debit-normal for asset/expense,
/// credit-normal otherwise. Every poster uses this to decide which side of a
/// line to populate.
#[must_use]
pub fn classify(account: &Account) -> NormalBalance {
    account.account_type.normal_balance()
}

/// The system accounts kasbook auto-provisions per outlet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemAccount {
    /// Cash drawer.
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
    /// Opening-balance equity: absorbs the balancing line of opening postings.
    OpeningBalanceEquity,
    /// Sales revenue.
    SalesRevenue,
    /// Service revenue.
    ServiceRevenue,
    /// Sales discount.
    SalesDiscount,
    /// Cost of goods sold.
    CostOfGoodsSold,
}

/// Template for provisioning one system account.
#[derive(Debug, Clone)]
pub struct SystemAccountSpec {
    /// Which system account this is.
    pub kind: SystemAccount,
    /// Account code.
    pub code: &'static str,
    /// Account name.
    pub name: &'static str,
    /// Account type.
    pub account_type: AccountType,
    /// Account subtype.
    pub subtype: AccountSubtype,
}

static SPECS: Lazy<Vec<SystemAccountSpec>> = Lazy::new(|| {
    use AccountSubtype as Sub;
    use AccountType as Ty;
    use SystemAccount as Sys;

    vec![
        SystemAccountSpec { kind: Sys::Cash, code: "1000", name: "Cash", account_type: Ty::Asset, subtype: Sub::Cash },
        SystemAccountSpec { kind: Sys::Bank, code: "1020", name: "Bank", account_type: Ty::Asset, subtype: Sub::Bank },
        SystemAccountSpec { kind: Sys::AccountsReceivable, code: "1100", name: "Accounts Receivable", account_type: Ty::Asset, subtype: Sub::AccountsReceivable },
        SystemAccountSpec { kind: Sys::Inventory, code: "1200", name: "Inventory", account_type: Ty::Asset, subtype: Sub::Inventory },
        SystemAccountSpec { kind: Sys::AccountsPayable, code: "2000", name: "Accounts Payable", account_type: Ty::Liability, subtype: Sub::AccountsPayable },
        SystemAccountSpec { kind: Sys::TaxPayable, code: "2100", name: "Tax Payable", account_type: Ty::Liability, subtype: Sub::TaxPayable },
        SystemAccountSpec { kind: Sys::OpeningBalanceEquity, code: "OB-EQUITY", name: "Opening Balance Equity", account_type: Ty::Equity, subtype: Sub::OpeningBalanceEquity },
        SystemAccountSpec { kind: Sys::SalesRevenue, code: "4000", name: "Sales Revenue", account_type: Ty::Revenue, subtype: Sub::SalesRevenue },
        SystemAccountSpec { kind: Sys::ServiceRevenue, code: "4100", name: "Service Revenue", account_type: Ty::Revenue, subtype: Sub::ServiceRevenue },
        SystemAccountSpec { kind: Sys::SalesDiscount, code: "4900", name: "Sales Discount", account_type: Ty::Revenue, subtype: Sub::SalesDiscount },
        SystemAccountSpec { kind: Sys::CostOfGoodsSold, code: "5000", name: "Cost of Goods Sold", account_type: Ty::Expense, subtype: Sub::CostOfGoodsSold },
    ]
});

/// Returns the full system-account template table.
#[must_use]
pub fn system_account_specs() -> &'static [SystemAccountSpec] {
    &SPECS
}

impl SystemAccount {
    /// Returns the provisioning template for this system account.
    #[must_use]
    pub fn spec(self) -> &'static SystemAccountSpec {
        // The table covers every variant.
        SPECS
            .iter()
            .find(|s| s.kind == self)
            .unwrap_or(&SPECS[0])
    }

    /// The subtype this system account is looked up by.
    #[must_use]
    pub fn subtype(self) -> AccountSubtype {
        self.spec().subtype
    }
}
