//! Business workflows.
//!
//! Each workflow turns one business action into its document, ledger and
//! stock effects, carrying the degraded-success policy: once the source
//! document is committed, downstream failures surface as a partial outcome
//! instead of an error, so the caller can retry just the missing step.

pub mod adjustments;
pub mod expenses;
pub mod opening;
pub mod purchases;
pub mod sales;
pub mod types;

pub use adjustments::{AdjustmentOutcome, AdjustmentWorkflow, StockAdjustmentInput};
pub use expenses::{ExpenseInput, ExpenseOutcome, ExpenseWorkflow};
pub use opening::{OpeningBalanceLine, OpeningBalanceWorkflow};
pub use purchases::{PurchaseInput, PurchaseItemInput, PurchaseOutcome, PurchaseWorkflow};
pub use sales::{
    SaleInput, SaleItemInput, SaleOutcome, SaleReturnInput, SaleReturnOutcome, SalesWorkflow,
};
pub use types::WorkflowOutcome;
