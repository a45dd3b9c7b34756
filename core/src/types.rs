//! Shared primitive types used across the generator.

use chrono::NaiveDate;

/// Calendar day. Stored in SQLite as `YYYY-MM-DD` text.
pub type Day = NaiveDate;

/// Globally unique, monotonically increasing support ticket id.
pub type TicketId = i64;

/// Money in integer cents. All apportionment is done in cents so that
/// per-date sums reconcile exactly; conversion to REAL happens at the
/// store boundary.
pub type Cents = i64;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_day(day: Day) -> String {
    day.format(DATE_FORMAT).to_string()
}

pub fn parse_day(text: &str) -> Result<Day, chrono::ParseError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
}

pub fn cents_from_f64(amount: f64) -> Cents {
    (amount * 100.0).round() as Cents
}

pub fn cents_to_f64(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

/// Round to `places` decimal digits.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
