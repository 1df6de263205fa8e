//! Storage interfaces, the in-memory store, and the engines and workflows
//! that drive postings against them.
//!
//! # Modules
//!
//! - `repositories` - Async repository traits the engines depend on
//! - `memory` - Thread-safe in-memory implementation of every repository
//! - `engines` - Numbering, posting, reversal, inventory, closing,
//!   diagnostics
//! - `workflow` - Business workflows tying documents, ledger and stock
//!   together

pub mod engines;
pub mod error;
pub mod memory;
pub mod repositories;
pub mod workflow;

pub use error::StoreError;
pub use memory::InMemoryStore;
