use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, TimeZone};
use regex::Regex;

static PAGE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.]+$").unwrap());
static CONTROL_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n\t]+").unwrap());

/// Formats a timestamp as `YYYYMMDD`, the host's YEAR_MONTH_DAY format.
pub fn format_host_date<Tz: TimeZone>(date: &DateTime<Tz>) -> String {
    date.naive_utc().format("%Y%m%d").to_string()
}

/// Unix seconds at UTC midnight of `date`.
pub fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Numeric ids and usernames (letters, digits, dots) are accepted.
pub fn is_valid_page_id(page_id: &str) -> bool {
    PAGE_ID.is_match(page_id)
}

/// Drops non-ASCII characters and folds line breaks and tabs into single spaces.
pub fn sanitize_text(text: &str) -> String {
    let ascii: String = text.chars().filter(char::is_ascii).collect();
    CONTROL_RUN.replace_all(&ascii, " ").trim().to_string()
}
