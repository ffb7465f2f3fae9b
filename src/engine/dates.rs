//! Order-date parsing and ETA derivation.
//!
//! Import and live tracking fall back to separate fixed offsets; both are five
//! days today but are kept apart on purpose so either can move alone.

use chrono::{Days, NaiveDate, NaiveDateTime};

use crate::models::tracking::UNKNOWN_DATE;

/// Offset used during import when a row carries no shipping schedule.
pub const IMPORT_FALLBACK_SHIPPING_DAYS: i64 = 5;

/// Offset used by the tracking lookup when the stored ETA is missing.
pub const TRACKING_FALLBACK_SHIPPING_DAYS: i64 = 5;

/// Substituted for unparseable order dates during import.
pub const FALLBACK_ORDER_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2018, 1, 1) {
    Some(date) => date,
    None => panic!("fallback order date is valid"),
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = [DATE_FORMAT, "%m/%d/%Y"];

pub fn parse_order_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
                .map(|datetime| datetime.date())
        })
}

/// Adds a possibly negative day offset; `None` if the result leaves chrono's range.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    let magnitude = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(magnitude)
    } else {
        date.checked_sub_days(magnitude)
    }
}

/// `order_date + scheduled_days`, or the import fallback offset when unscheduled.
pub fn import_eta(order_date: NaiveDate, scheduled_days: Option<i64>) -> Option<NaiveDate> {
    add_days(
        order_date,
        scheduled_days.unwrap_or(IMPORT_FALLBACK_SHIPPING_DAYS),
    )
}

/// Expected delivery date for the tracking view.
///
/// The stored ETA wins; otherwise the order date plus the tracking fallback
/// offset; otherwise the `"Unknown"` sentinel.
pub fn expected_delivery(stored_eta: Option<NaiveDate>, order_date: &str) -> String {
    stored_eta
        .or_else(|| {
            parse_order_date(order_date)
                .and_then(|date| add_days(date, TRACKING_FALLBACK_SHIPPING_DAYS))
        })
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN_DATE.to_string())
}
