//! Delivery date estimation.
//!
//! Orders ship within a fixed number of business days. Weekends are skipped; there is
//! no holiday calendar.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};

/// Business days between placing an order and its estimated delivery.
pub const DELIVERY_BUSINESS_DAYS: u32 = 3;

/// Returns true for Monday through Friday.
#[must_use]
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Estimates the delivery date for an order placed at `base`.
///
/// Walks forward one calendar day at a time and counts only business days until
/// [`DELIVERY_BUSINESS_DAYS`] have been counted. The base day itself is never counted and
/// the time of day is discarded.
///
/// A Thursday order is estimated for the following Tuesday; a Friday order for Wednesday.
#[must_use]
pub fn estimate_delivery(base: DateTime<Utc>) -> NaiveDate {
    add_business_days(base.date_naive(), DELIVERY_BUSINESS_DAYS)
}

/// Adds `business_days` business days to `date`.
#[must_use]
pub fn add_business_days(date: NaiveDate, business_days: u32) -> NaiveDate {
    let mut current = date;
    let mut counted = 0;
    while counted < business_days {
        let Some(next) = current.checked_add_days(Days::new(1)) else {
            break;
        };
        current = next;
        if is_business_day(current) {
            counted += 1;
        }
    }
    current
}
