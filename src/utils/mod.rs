//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;
use std::sync::OnceLock;

/// Normalize whitespace in text
///
/// Also folds the non-breaking and ideographic spaces the reservation site
/// pads its table cells with.
pub fn normalize_whitespace(text: &str) -> String {
    static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

    let re = WHITESPACE_RE
        .get_or_init(|| Regex::new(r"[\s\u{00A0}\u{3000}]+").expect("Invalid regex pattern"));

    re.replace_all(text.trim(), " ").trim().to_string()
}

/// Truncate text to at most `max_chars` characters, appending `...` when cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Parse a `YYYYMMDD` date
pub fn parse_ymd(ymd: &str) -> Option<NaiveDate> {
    if ymd.len() != 8 || !ymd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(ymd, "%Y%m%d").ok()
}

/// Single-character Japanese weekday name
pub fn weekday_ja(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}

/// Format a date as `M月d日（曜）`
pub fn format_date_ja(date: NaiveDate) -> String {
    format!(
        "{}月{}日（{}）",
        date.month(),
        date.day(),
        weekday_ja(date.weekday())
    )
}

/// Days of `year`/`month` falling on one of `weekdays`
pub fn days_of_week(year: i32, month: u32, weekdays: &[Weekday]) -> Vec<u32> {
    let Some(mut date) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let mut days = Vec::new();
    while date.month() == month {
        if weekdays.contains(&date.weekday()) {
            days.push(date.day());
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    days
}
