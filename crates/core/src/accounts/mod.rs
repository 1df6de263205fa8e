//! Chart of accounts.
//!
//! Account types, normal-balance classification, and the system-account
//! templates that every outlet is provisioned with.

pub mod directory;
pub mod types;

pub use directory::{SystemAccount, SystemAccountSpec, classify, system_account_specs};
pub use types::{Account, AccountSubtype, AccountType, NormalBalance};
