//! Seasonal and growth multipliers.
//!
//! Pure functions of a date (and, for growth, the series start date).
//! They compose multiplicatively with per-day noise drawn elsewhere.

use crate::types::Day;
use chrono::{Datelike, Duration, Weekday};

/// Monday .. Sunday.
pub const DAY_OF_WEEK_FACTORS: [f64; 7] = [1.0, 1.05, 1.08, 1.06, 0.95, 0.75, 0.70];

/// January .. December. New-year bump, summer trough, back-to-school rise.
pub const SEASONALITY_FACTORS: [f64; 12] = [
    1.25, 1.10, 1.05, 1.00, 0.95, 0.85, 0.80, 0.85, 1.15, 1.10, 1.00, 0.90,
];

pub fn day_of_week_factor(day: Day) -> f64 {
    DAY_OF_WEEK_FACTORS[day.weekday().num_days_from_monday() as usize]
}

pub fn seasonality_factor(day: Day) -> f64 {
    SEASONALITY_FACTORS[day.month0() as usize]
}

/// Compound growth `(1 + annual_rate) ^ (days_elapsed / 365)`.
pub fn growth_factor(day: Day, start: Day, annual_rate: f64) -> f64 {
    let days_elapsed = days_between(start, day) as f64;
    (1.0 + annual_rate).powf(days_elapsed / 365.0)
}

/// Signed whole days from `from` to `to`.
pub fn days_between(from: Day, to: Day) -> i64 {
    (to - from).num_days()
}

pub fn is_billing_day(day: Day, billing_days: &[u32]) -> bool {
    billing_days.contains(&day.day())
}

pub fn first_monday_on_or_after(day: Day) -> Day {
    let offset = (7 - day.weekday().num_days_from_monday()) % 7;
    day + Duration::days(offset as i64)
}

/// Every day in `[start, end]`, inclusive. Empty when `end < start`.
pub fn days_inclusive(start: Day, end: Day) -> impl Iterator<Item = Day> {
    start.iter_days().take_while(move |d| *d <= end)
}

pub fn is_monday(day: Day) -> bool {
    day.weekday() == Weekday::Mon
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn weekday_table_extremes() {
        // 2026-01-21 is a Wednesday, 2026-01-25 a Sunday.
        assert_eq!(day_of_week_factor(d(2026, 1, 21)), 1.08);
        assert_eq!(day_of_week_factor(d(2026, 1, 25)), 0.70);
        assert_eq!(day_of_week_factor(d(2026, 1, 26)), 1.0);
    }

    #[test]
    fn seasonality_peaks_in_january() {
        assert_eq!(seasonality_factor(d(2025, 1, 10)), 1.25);
        assert_eq!(seasonality_factor(d(2025, 7, 10)), 0.80);
        assert_eq!(seasonality_factor(d(2025, 12, 31)), 0.90);
    }

    #[test]
    fn growth_compounds_annually() {
        let start = d(2024, 1, 27);
        assert_eq!(growth_factor(start, start, 0.15), 1.0);
        let one_year = start + Duration::days(365);
        assert!((growth_factor(one_year, start, 0.15) - 1.15).abs() < 1e-12);
        let two_years = start + Duration::days(730);
        assert!((growth_factor(two_years, start, 0.15) - 1.3225).abs() < 1e-9);
    }

    #[test]
    fn billing_days_match_day_of_month() {
        let days = [1, 2, 15, 16];
        assert!(is_billing_day(d(2025, 3, 1), &days));
        assert!(is_billing_day(d(2025, 3, 16), &days));
        assert!(!is_billing_day(d(2025, 3, 3), &days));
        assert!(!is_billing_day(d(2025, 3, 14), &days));
    }

    #[test]
    fn monday_alignment() {
        // 2024-01-27 is a Saturday.
        assert_eq!(first_monday_on_or_after(d(2024, 1, 27)), d(2024, 1, 29));
        assert_eq!(first_monday_on_or_after(d(2024, 1, 29)), d(2024, 1, 29));
        assert!(is_monday(first_monday_on_or_after(d(2025, 6, 4))));
    }

    #[test]
    fn inclusive_window_counts_both_ends() {
        assert_eq!(days_inclusive(d(2024, 1, 27), d(2026, 1, 26)).count(), 731);
        assert_eq!(days_inclusive(d(2024, 1, 27), d(2024, 1, 27)).count(), 1);
        assert_eq!(days_inclusive(d(2024, 1, 28), d(2024, 1, 27)).count(), 0);
    }
}
