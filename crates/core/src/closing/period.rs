//! Period boundary resolution.
//!
//! Periods chain hard: when a prior closing of the same type exists, the new
//! period starts exactly at its end, so consecutive closings can never gap or
//! overlap. The first closing may instead expand backwards to the earliest
//! ledger entry, folding all history into one period.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::error::ClosingError;
use super::types::ClosingType;

/// Resolved boundaries for a closing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    /// Inclusive period start.
    pub start: DateTime<Utc>,
    /// Exclusive period end.
    pub end: DateTime<Utc>,
    /// Whether no prior closing of this type exists.
    pub is_first_closing: bool,
    /// Days of pre-period history folded in (first closing only).
    pub historical_days: i64,
}

/// Formats the cutoff hour as an `HH:00` label.
#[must_use]
pub fn cutoff_time_label(cutoff_hour: u32) -> String {
    format!("{cutoff_hour:02}:00")
}

fn at_hour(date: NaiveDate, hour: u32) -> Result<DateTime<Utc>, ClosingError> {
    date.and_hms_opt(hour, 0, 0)
        .map(|dt| dt.and_utc())
        .ok_or(ClosingError::InvalidCutoffHour(hour))
}

fn first_of_next_month(date: NaiveDate) -> Result<NaiveDate, ClosingError> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // Day 1 always exists; treat failure as an impossible date rather than
    // panicking inside date arithmetic.
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ClosingError::InvalidCutoffHour(0))
}

/// Resolves period boundaries for a requested closing.
///
/// `previous_period_end` is the end of the most recent prior closing of the
/// same type for the outlet, if any. `earliest_entry` is the date of the
/// outlet's oldest ledger entry, consulted only for a first closing with
/// `include_historical` set.
///
/// # Errors
///
/// - [`ClosingError::InvalidCutoffHour`] when `cutoff_hour` is not 0-23
/// - [`ClosingError::InvalidPeriod`] when the resolved start is not before
///   the resolved end
pub fn resolve_period(
    closing_type: ClosingType,
    closing_date: NaiveDate,
    cutoff_hour: u32,
    previous_period_end: Option<DateTime<Utc>>,
    earliest_entry: Option<DateTime<Utc>>,
    include_historical: bool,
) -> Result<PeriodBounds, ClosingError> {
    if cutoff_hour > 23 {
        return Err(ClosingError::InvalidCutoffHour(cutoff_hour));
    }

    let end = match closing_type {
        ClosingType::Day => at_hour(closing_date.succ_opt().unwrap_or(closing_date), cutoff_hour)?,
        ClosingType::Month => at_hour(first_of_next_month(closing_date)?, cutoff_hour)?,
    };

    let (start, is_first_closing, historical_days) = match previous_period_end {
        Some(previous_end) => (previous_end, false, 0),
        None => match earliest_entry.filter(|_| include_historical) {
            Some(earliest) => {
                let earliest_date = earliest.date_naive();
                let start = at_hour(earliest_date, 0)?;
                let days = (closing_date - earliest_date).num_days() + 1;
                (start, true, days.max(0))
            }
            None => (at_hour(closing_date, 0)?, true, 0),
        },
    };

    if start >= end {
        return Err(ClosingError::InvalidPeriod { start, end });
    }

    Ok(PeriodBounds {
        start,
        end,
        is_first_closing,
        historical_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_month_closing_expands_to_earliest_entry() {
        let earliest = Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap();
        let bounds = resolve_period(
            ClosingType::Month,
            date(2024, 3, 1),
            0,
            None,
            Some(earliest),
            true,
        )
        .unwrap();

        assert!(bounds.is_first_closing);
        assert_eq!(bounds.start, Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap());
        assert_eq!(bounds.historical_days, 57);
        assert_eq!(bounds.end, Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_first_closing_without_history_starts_at_midnight() {
        let bounds = resolve_period(ClosingType::Day, date(2025, 6, 15), 5, None, None, true)
            .unwrap();
        assert!(bounds.is_first_closing);
        assert_eq!(bounds.historical_days, 0);
        assert_eq!(bounds.start, Utc.with_ymd_and_hms(2025, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(bounds.end, Utc.with_ymd_and_hms(2025, 6, 16, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_historical_expansion_ignored_when_disabled() {
        let earliest = Utc.with_ymd_and_hms(2024, 1, 5, 14, 30, 0).unwrap();
        let bounds = resolve_period(
            ClosingType::Month,
            date(2024, 3, 1),
            0,
            None,
            Some(earliest),
            false,
        )
        .unwrap();
        assert_eq!(bounds.start, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(bounds.historical_days, 0);
    }

    #[test]
    fn test_chained_closing_starts_at_previous_end() {
        let previous_end = Utc.with_ymd_and_hms(2025, 6, 15, 5, 0, 0).unwrap();
        let bounds = resolve_period(
            ClosingType::Day,
            date(2025, 6, 15),
            5,
            Some(previous_end),
            None,
            true,
        )
        .unwrap();
        assert!(!bounds.is_first_closing);
        assert_eq!(bounds.start, previous_end);
        assert_eq!(bounds.end, Utc.with_ymd_and_hms(2025, 6, 16, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_inverted_period_rejected() {
        // Previous closing already covers past the requested date.
        let previous_end = Utc.with_ymd_and_hms(2025, 6, 20, 5, 0, 0).unwrap();
        let err = resolve_period(
            ClosingType::Day,
            date(2025, 6, 15),
            5,
            Some(previous_end),
            None,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, ClosingError::InvalidPeriod { .. }));
    }

    #[test]
    fn test_december_rolls_into_january() {
        let bounds = resolve_period(ClosingType::Month, date(2025, 12, 31), 5, None, None, false)
            .unwrap();
        assert_eq!(bounds.end, Utc.with_ymd_and_hms(2026, 1, 1, 5, 0, 0).unwrap());
    }

    #[rstest]
    #[case(24)]
    #[case(99)]
    fn test_out_of_range_cutoff_rejected(#[case] hour: u32) {
        let err = resolve_period(ClosingType::Day, date(2025, 6, 15), hour, None, None, false)
            .unwrap_err();
        assert!(matches!(err, ClosingError::InvalidCutoffHour(h) if h == hour));
    }

    #[test]
    fn test_cutoff_label() {
        assert_eq!(cutoff_time_label(5), "05:00");
        assert_eq!(cutoff_time_label(0), "00:00");
        assert_eq!(cutoff_time_label(23), "23:00");
    }
}
