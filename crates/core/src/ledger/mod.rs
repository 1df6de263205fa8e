//! Double-entry ledger logic.
//!
//! - Voucher and ledger-entry domain types
//! - Balance validation with the 0.01 posting tolerance
//! - Voucher number formatting and sequencing
//! - Posting preparation (lines to voucher + entries + balance deltas)
//! - Reversal mirroring

pub mod error;
pub mod numbering;
pub mod posting;
pub mod reversal;
pub mod types;
pub mod validation;

pub use error::LedgerError;
pub use posting::{BalancePolicy, PostingRequest, PreparedPosting, prepare_posting};
pub use reversal::mirror_lines;
pub use types::{
    BalanceDelta, DocumentRef, EntrySide, LedgerEntry, PostingLine, PostingReceipt, ReferenceType,
    Voucher, VoucherLine, VoucherStatus, VoucherType,
};
pub use validation::{balance_tolerance, validate_lines};
