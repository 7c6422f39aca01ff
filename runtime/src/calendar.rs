//! Business-day expansion for `MM-DD-YYYY` date ranges.
//!
//! Weekdays only. There is no holiday calendar, so exchange holidays are
//! requested like any other day and simply come back without charts.

use crate::error::InvalidRangeError;
use chrono::{Datelike, NaiveDate, Weekday};

/// Date format used on the command line, in URLs and in output rows.
pub const DATE_FORMAT: &str = "%m-%d-%Y";

/// Parse a `MM-DD-YYYY` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Format a date as `MM-DD-YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Whether a date falls on Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every weekday in `[start, end]`, in ascending order.
pub fn business_days_between(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, InvalidRangeError> {
    if end < start {
        return Err(InvalidRangeError::Inverted {
            start: format_date(start),
            end: format_date(end),
        });
    }

    Ok(start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .collect())
}

/// Expand a `MM-DD-YYYY` range into its business days.
pub fn business_days(start: &str, end: &str) -> Result<Vec<NaiveDate>, InvalidRangeError> {
    let start_date = parse_date(start).ok_or_else(|| InvalidRangeError::Unparseable {
        bound: "start",
        value: start.to_string(),
    })?;
    let end_date = parse_date(end).ok_or_else(|| InvalidRangeError::Unparseable {
        bound: "end",
        value: end.to_string(),
    })?;
    business_days_between(start_date, end_date)
}
