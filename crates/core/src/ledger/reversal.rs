//! Reversal mirroring.
//!
//! A reversal is a brand-new voucher whose lines mirror the original's
//! debits and credits, so the pair nets to zero on every account while both
//! stay in the audit trail.

use super::error::LedgerError;
use super::types::{PostingLine, Voucher, VoucherStatus};

/// Mirrors a voucher's lines: debits become credits and vice versa.
///
/// # Errors
///
/// - [`LedgerError::NotReversible`] when the voucher is not posted
/// - [`LedgerError::ReasonRequired`] for an empty reason
pub fn mirror_lines(voucher: &Voucher, reason: &str) -> Result<Vec<PostingLine>, LedgerError> {
    if voucher.status != VoucherStatus::Posted {
        return Err(LedgerError::NotReversible(voucher.id));
    }
    if reason.trim().is_empty() {
        return Err(LedgerError::ReasonRequired);
    }

    Ok(voucher
        .lines
        .iter()
        .map(|line| PostingLine {
            account_id: line.account_id,
            // Exactly one of debit/credit is non-zero per line.
            side: if line.debit > line.credit {
                super::types::EntrySide::Credit
            } else {
                super::types::EntrySide::Debit
            },
            amount: line.debit.max(line.credit),
        })
        .collect())
}

/// Narration for a reversal voucher, carrying the reason and the original
/// voucher number.
#[must_use]
pub fn reversal_narration(original_number: &str, reason: &str) -> String {
    format!("Reversal of {original_number}: {}", reason.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{
        DocumentRef, EntrySide, ReferenceType, VoucherLine, VoucherType,
    };
    use chrono::Utc;
    use kasbook_shared::types::{AccountId, OutletId, UserId, VoucherId};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn voucher(lines: Vec<VoucherLine>) -> Voucher {
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();
        Voucher {
            id: VoucherId::new(),
            voucher_number: "PUR-202506-00042".to_string(),
            voucher_type: VoucherType::Purchase,
            date: Utc::now(),
            narration: "Stock purchase".to_string(),
            lines,
            total_debit,
            total_credit,
            status: VoucherStatus::Posted,
            reference: DocumentRef::bare(ReferenceType::Purchase),
            outlet_id: OutletId::new(),
            created_by: UserId::new(),
        }
    }

    fn line(name: &str, debit: Decimal, credit: Decimal) -> VoucherLine {
        VoucherLine {
            account_id: AccountId::new(),
            account_name: name.to_string(),
            debit,
            credit,
        }
    }

    #[test]
    fn test_mirror_swaps_sides() {
        let original = voucher(vec![
            line("Inventory", dec!(500), Decimal::ZERO),
            line("Cash", Decimal::ZERO, dec!(500)),
        ]);

        let mirrored = mirror_lines(&original, "duplicate entry").unwrap();
        assert_eq!(mirrored.len(), 2);
        assert_eq!(mirrored[0].side, EntrySide::Credit);
        assert_eq!(mirrored[0].amount, dec!(500));
        assert_eq!(mirrored[1].side, EntrySide::Debit);
        assert_eq!(mirrored[1].amount, dec!(500));
    }

    #[test]
    fn test_empty_reason_rejected() {
        let original = voucher(vec![
            line("Inventory", dec!(500), Decimal::ZERO),
            line("Cash", Decimal::ZERO, dec!(500)),
        ]);
        assert!(matches!(
            mirror_lines(&original, "   "),
            Err(LedgerError::ReasonRequired)
        ));
    }

    #[test]
    fn test_non_posted_voucher_not_reversible() {
        let mut original = voucher(vec![
            line("Inventory", dec!(500), Decimal::ZERO),
            line("Cash", Decimal::ZERO, dec!(500)),
        ]);
        original.status = VoucherStatus::Approved;
        assert!(matches!(
            mirror_lines(&original, "wrong amount"),
            Err(LedgerError::NotReversible(_))
        ));
    }

    #[test]
    fn test_narration_carries_reason_and_number() {
        let narration = reversal_narration("PUR-202506-00042", " wrong supplier ");
        assert_eq!(narration, "Reversal of PUR-202506-00042: wrong supplier");
    }

    proptest! {
        /// A voucher plus its reversal nets to zero on every account.
        #[test]
        fn prop_reversal_nets_to_zero(amounts in prop::collection::vec(1u64..1_000_000, 1..8)) {
            let total: u64 = amounts.iter().sum();
            let mut lines: Vec<VoucherLine> = amounts
                .iter()
                .map(|&a| line("Expense", Decimal::from(a), Decimal::ZERO))
                .collect();
            lines.push(line("Cash", Decimal::ZERO, Decimal::from(total)));

            let original = voucher(lines);
            let mirrored = mirror_lines(&original, "reverse").unwrap();

            for (orig, mirror) in original.lines.iter().zip(&mirrored) {
                let orig_net = orig.debit - orig.credit;
                let mirror_net = match mirror.side {
                    EntrySide::Debit => mirror.amount,
                    EntrySide::Credit => -mirror.amount,
                };
                prop_assert_eq!(orig_net + mirror_net, Decimal::ZERO);
            }
        }
    }
}
