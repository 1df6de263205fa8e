//! Engines: the stateful services that drive ledger, inventory, closing and
//! diagnostic operations against the repositories.

pub mod closing;
pub mod diagnostics;
pub mod inventory;
pub mod numbering;
pub mod posting;
pub mod reversal;

pub use closing::ClosingEngine;
pub use diagnostics::DiagnosticsEngine;
pub use inventory::{InventoryMovementLedger, MovementRecord, WeightedAverageCostEngine};
pub use numbering::VoucherNumberAllocator;
pub use posting::LedgerPostingEngine;
pub use reversal::ReversalEngine;
