//! Voucher number allocation.
//!
//! Scan-increment-verify with a bounded retry loop. The read and the write
//! are not one atomic step, so a concurrent allocator can take the same
//! candidate; the existence re-check plus retries shrink that window, and
//! the timestamp fallback guarantees progress when they run out.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use kasbook_core::ledger::numbering::{
    MAX_ALLOCATION_ATTEMPTS, fallback_number, format_number, highest_sequence, scan_prefix,
};
use kasbook_core::ledger::{LedgerError, VoucherType};
use kasbook_shared::types::OutletId;

use crate::repositories::VoucherRepository;

/// Allocates unique voucher numbers per outlet, type and month.
#[derive(Clone)]
pub struct VoucherNumberAllocator {
    vouchers: Arc<dyn VoucherRepository>,
}

impl VoucherNumberAllocator {
    /// Creates an allocator over a voucher repository.
    #[must_use]
    pub fn new(vouchers: Arc<dyn VoucherRepository>) -> Self {
        Self { vouchers }
    }

    /// Allocates the next number for the outlet, type and month.
    ///
    /// Never fails on contention: after the retries are exhausted it falls
    /// back to a timestamp-suffixed number.
    ///
    /// # Errors
    ///
    /// [`LedgerError::Storage`] when the repository itself fails.
    pub async fn allocate(
        &self,
        outlet_id: OutletId,
        voucher_type: VoucherType,
        month: NaiveDate,
    ) -> Result<String, LedgerError> {
        let prefix = scan_prefix(voucher_type, month);

        for attempt in 0..MAX_ALLOCATION_ATTEMPTS {
            let existing = self
                .vouchers
                .voucher_numbers_with_prefix(outlet_id, &prefix)
                .await?;
            let next = highest_sequence(existing.iter().map(String::as_str)) + 1;
            let candidate = format_number(voucher_type, month, next);

            if !self
                .vouchers
                .voucher_number_exists(outlet_id, &candidate)
                .await?
            {
                return Ok(candidate);
            }
            tracing::warn!(
                %outlet_id,
                candidate,
                attempt = attempt + 1,
                "voucher number collision, retrying"
            );
        }

        let fallback = fallback_number(voucher_type, month, Utc::now());
        tracing::warn!(
            %outlet_id,
            fallback,
            "voucher numbering retries exhausted, using timestamp fallback"
        );
        Ok(fallback)
    }
}
