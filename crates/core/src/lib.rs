//! Core business logic for Kasbook.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts, normal-balance classification
//! - `ledger` - Double-entry vouchers, numbering, posting, reversal
//! - `inventory` - Stock movement chaining and weighted-average costing
//! - `closing` - Day/month period boundaries and cash-basis profit
//! - `documents` - Purchase/expense/sale/return source documents
//! - `diagnostics` - Trial-balance reconciliation findings

pub mod accounts;
pub mod closing;
pub mod diagnostics;
pub mod documents;
pub mod inventory;
pub mod ledger;
