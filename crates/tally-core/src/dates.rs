//! # Date Utilities
//!
//! Calendar bucketing and display formatting. Every function takes its
//! reference instant explicitly so callers (and tests) control "now".
//!
//! Week buckets start on Sunday; month and year buckets start on the 1st.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::types::DateFormat;

/// Truncates an instant to the start of its day (00:00:00.000 UTC).
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive()
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
}

/// Extends an instant to the end of its day (23:59:59.999 UTC).
pub fn end_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(at) + Duration::days(1) - Duration::milliseconds(1)
}

/// Start of the week containing `at` (Sunday anchor).
pub fn start_of_week(at: DateTime<Utc>) -> DateTime<Utc> {
    let back = at.weekday().num_days_from_sunday() as i64;
    start_of_day(at) - Duration::days(back)
}

/// Start of the month containing `at`.
pub fn start_of_month(at: DateTime<Utc>) -> DateTime<Utc> {
    let d = at.date_naive();
    let first = d.with_day(1).unwrap_or(d);
    first.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Start of the year containing `at`.
pub fn start_of_year(at: DateTime<Utc>) -> DateTime<Utc> {
    let d = at.date_naive();
    let first = NaiveDate::from_ymd_opt(d.year(), 1, 1).unwrap_or(d);
    first.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Current calendar date.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Current instant.
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Formats a calendar date according to the user's display preference.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tally_core::dates::format_date;
/// use tally_core::types::DateFormat;
///
/// let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// assert_eq!(format_date(date, DateFormat::MonthDayYear), "03/01/2024");
/// assert_eq!(format_date(date, DateFormat::DayMonthYear), "01/03/2024");
/// assert_eq!(format_date(date, DateFormat::YearMonthDay), "2024-03-01");
/// ```
pub fn format_date(date: NaiveDate, format: DateFormat) -> String {
    match format {
        DateFormat::MonthDayYear => date.format("%m/%d/%Y").to_string(),
        DateFormat::DayMonthYear => date.format("%d/%m/%Y").to_string(),
        DateFormat::YearMonthDay => date.format("%Y-%m-%d").to_string(),
    }
}

/// Formats a date relative to `now`: "Today", "Yesterday", "N days ago"
/// within a week, otherwise the absolute date in the given format.
pub fn format_relative_date(date: NaiveDate, now: DateTime<Utc>, format: DateFormat) -> String {
    let today = now.date_naive();
    if date == today {
        return "Today".to_string();
    }
    if date == today - Duration::days(1) {
        return "Yesterday".to_string();
    }
    let diff = (today - date).num_days();
    if diff > 1 && diff < 7 {
        return format!("{diff} days ago");
    }
    format_date(date, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 30, 15).unwrap()
    }

    #[test]
    fn test_day_bounds() {
        let now = at(2024, 3, 15, 14);
        assert_eq!(start_of_day(now).to_rfc3339(), "2024-03-15T00:00:00+00:00");
        assert_eq!(
            end_of_day(now).to_rfc3339(),
            "2024-03-15T23:59:59.999+00:00"
        );
    }

    #[test]
    fn test_start_of_week_is_sunday() {
        // 2024-03-15 is a Friday; the week started Sunday 2024-03-10.
        let now = at(2024, 3, 15, 14);
        let start = start_of_week(now);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        // A Sunday maps to itself.
        let sunday = at(2024, 3, 10, 9);
        assert_eq!(start_of_week(sunday).date_naive(), sunday.date_naive());
    }

    #[test]
    fn test_start_of_month_and_year() {
        let now = at(2024, 3, 15, 14);
        assert_eq!(
            start_of_month(now).date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(
            start_of_year(now).date_naive(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_relative_dates() {
        let now = at(2024, 3, 15, 14);
        let fmt = DateFormat::YearMonthDay;
        let day = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

        assert_eq!(format_relative_date(day(15), now, fmt), "Today");
        assert_eq!(format_relative_date(day(14), now, fmt), "Yesterday");
        assert_eq!(format_relative_date(day(12), now, fmt), "3 days ago");
        assert_eq!(format_relative_date(day(1), now, fmt), "2024-03-01");
    }
}
