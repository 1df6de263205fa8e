//! The reversal engine: posts a mirror voucher against a prior posting.
//!
//! The original voucher and its entries are never touched; the audit trail
//! grows, it never shrinks.

use std::sync::Arc;

use chrono::Utc;

use kasbook_core::ledger::reversal::{mirror_lines, reversal_narration};
use kasbook_core::ledger::{
    BalancePolicy, DocumentRef, LedgerError, PostingReceipt, PostingRequest, ReferenceType,
    VoucherType,
};
use kasbook_shared::types::{UserId, VoucherId};

use crate::repositories::VoucherRepository;

use super::posting::LedgerPostingEngine;

/// Reverses posted vouchers with mirrored counter-vouchers.
#[derive(Clone)]
pub struct ReversalEngine {
    vouchers: Arc<dyn VoucherRepository>,
    posting: LedgerPostingEngine,
}

impl ReversalEngine {
    /// Creates a reversal engine.
    #[must_use]
    pub fn new(vouchers: Arc<dyn VoucherRepository>, posting: LedgerPostingEngine) -> Self {
        Self { vouchers, posting }
    }

    /// Posts a new voucher mirroring every line of `voucher_id`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::VoucherNotFound`] when the original is missing
    /// - [`LedgerError::NotReversible`] / [`LedgerError::ReasonRequired`]
    ///   from the mirroring rules
    pub async fn reverse(
        &self,
        voucher_id: VoucherId,
        reason: &str,
        reversed_by: UserId,
    ) -> Result<PostingReceipt, LedgerError> {
        let original = self
            .vouchers
            .voucher(voucher_id)
            .await?
            .ok_or(LedgerError::VoucherNotFound(voucher_id))?;

        let lines = mirror_lines(&original, reason)?;
        let request = PostingRequest {
            voucher_type: VoucherType::Reversal,
            date: Utc::now(),
            narration: reversal_narration(&original.voucher_number, reason),
            lines,
            reference: DocumentRef {
                reference_type: ReferenceType::Reversal,
                reference_id: Some(original.id.into_inner()),
                reference_number: Some(original.voucher_number.clone()),
            },
            outlet_id: original.outlet_id,
            created_by: reversed_by,
        };

        let receipt = self.posting.post(request, BalancePolicy::Strict).await?;
        tracing::info!(
            original = %original.voucher_number,
            reversal = %receipt.voucher_number,
            "reversed voucher"
        );
        Ok(receipt)
    }
}
