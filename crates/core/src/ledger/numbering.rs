//! Voucher number formatting and sequencing.
//!
//! Numbers look like `PUR-202506-00042`: a document-type prefix, a calendar
//! month tag, and a 5-digit zero-padded sequence. When the allocator
//! exhausts its retries it falls back to a timestamp-suffixed number, trading
//! gap-free sequencing for liveness.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::types::VoucherType;

/// Maximum allocation attempts before falling back to a timestamp suffix.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 5;

/// Width of the zero-padded sequence segment.
const SEQUENCE_WIDTH: usize = 5;

/// Returns the fixed document-type prefix for a voucher type.
///
/// Journal vouchers have no dedicated prefix in the upstream numbering
/// namespace; they share the allocator under `JV`.
#[must_use]
pub const fn doc_prefix(voucher_type: VoucherType) -> &'static str {
    match voucher_type {
        VoucherType::Purchase => "PUR",
        VoucherType::Expense => "EXP",
        VoucherType::Sale => "JOB",
        VoucherType::Return => "RET",
        VoucherType::Journal | VoucherType::Receipt | VoucherType::Payment | VoucherType::Reversal => {
            "JV"
        }
    }
}

/// Formats the `YYYYMM` month tag for a date.
#[must_use]
pub fn month_tag(date: NaiveDate) -> String {
    format!("{:04}{:02}", date.year(), date.month())
}

/// The scan prefix for a voucher type and month, e.g. `PUR-202506-`.
#[must_use]
pub fn scan_prefix(voucher_type: VoucherType, month: NaiveDate) -> String {
    format!("{}-{}-", doc_prefix(voucher_type), month_tag(month))
}

/// Formats a full voucher number from prefix, month and sequence.
#[must_use]
pub fn format_number(voucher_type: VoucherType, month: NaiveDate, sequence: u32) -> String {
    format!(
        "{}{sequence:0width$}",
        scan_prefix(voucher_type, month),
        width = SEQUENCE_WIDTH
    )
}

/// Extracts the 5-digit sequence from a voucher number, if it has one.
///
/// Timestamp-fallback numbers (`...-T17497...`) yield `None` and are ignored
/// when scanning for the highest sequence.
#[must_use]
pub fn parse_sequence(number: &str) -> Option<u32> {
    let segment = number.rsplit('-').next()?;
    if segment.len() != SEQUENCE_WIDTH || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// The highest sequence among existing numbers (0 when none parse).
#[must_use]
pub fn highest_sequence<'a>(numbers: impl IntoIterator<Item = &'a str>) -> u32 {
    numbers
        .into_iter()
        .filter_map(parse_sequence)
        .max()
        .unwrap_or(0)
}

/// Timestamp-suffixed fallback number guaranteeing forward progress.
#[must_use]
pub fn fallback_number(voucher_type: VoucherType, month: NaiveDate, now: DateTime<Utc>) -> String {
    format!(
        "{}T{}",
        scan_prefix(voucher_type, month),
        now.timestamp_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn june() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_doc_prefixes() {
        assert_eq!(doc_prefix(VoucherType::Purchase), "PUR");
        assert_eq!(doc_prefix(VoucherType::Expense), "EXP");
        assert_eq!(doc_prefix(VoucherType::Sale), "JOB");
        assert_eq!(doc_prefix(VoucherType::Return), "RET");
        assert_eq!(doc_prefix(VoucherType::Journal), "JV");
        assert_eq!(doc_prefix(VoucherType::Reversal), "JV");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(VoucherType::Purchase, june(), 42), "PUR-202506-00042");
        assert_eq!(format_number(VoucherType::Journal, june(), 1), "JV-202506-00001");
    }

    #[test]
    fn test_parse_sequence() {
        assert_eq!(parse_sequence("PUR-202506-00042"), Some(42));
        assert_eq!(parse_sequence("JV-202506-00001"), Some(1));
        assert_eq!(parse_sequence("PUR-202506-99999"), Some(99_999));
    }

    #[test]
    fn test_parse_sequence_rejects_fallback_numbers() {
        assert_eq!(parse_sequence("PUR-202506-T1749700000000"), None);
        assert_eq!(parse_sequence("PUR-202506-123"), None);
        assert_eq!(parse_sequence("garbage"), None);
    }

    #[test]
    fn test_highest_sequence() {
        let numbers = ["PUR-202506-00042", "PUR-202506-00007", "PUR-202506-T1749"];
        assert_eq!(highest_sequence(numbers), 42);
        assert_eq!(highest_sequence([]), 0);
    }

    #[test]
    fn test_fallback_number_contains_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
        let number = fallback_number(VoucherType::Purchase, june(), now);
        assert!(number.starts_with("PUR-202506-T"));
        assert!(number.contains(&now.timestamp_millis().to_string()));
    }

    #[test]
    fn test_month_tag_zero_pads() {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(month_tag(jan), "202401");
    }
}
