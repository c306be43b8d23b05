//! Extractors for the navigation screens
//!
//! Each function pulls one piece of information the session walk needs out of
//! a screen: the session id, an iframe target, month and day links, the
//! purpose link, the booking form and the held-reservation list. Missing
//! elements are reported as `None` or an empty list; the navigator decides
//! whether that is fatal.

use chrono::Weekday;
use scraper::Html;

use super::cell_text;
use super::selectors::{ANY_TABLE, DATA_CELL, DAY_CELL, FORM, IFRAME, INPUT, LINK, MONTH_LINK, ROW};
use crate::crawler::url::{query_param, year_month_of};
use crate::models::{ReservationEntry, TimeSlot};
use crate::utils::days_of_week;

/// Booking form found on a slot's action page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
    pub action: String,
    pub fields: Vec<(String, String)>,
}

/// Session id embedded anywhere in the page as `<param>=<id>`
///
/// The id runs until the next `"`, `'`, `&` or whitespace.
pub fn extract_session_id(html: &str, param: &str) -> Option<String> {
    let needle = format!("{param}=");
    let start = html.find(&needle)? + needle.len();
    let id: String = html[start..]
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | '&' | '<' | '>') && !c.is_whitespace())
        .collect();
    (!id.is_empty()).then_some(id)
}

/// `src` of the first iframe
pub fn first_iframe_src(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&IFRAME)
        .next()
        .and_then(|iframe| iframe.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

/// Links of the months that can currently be browsed
pub fn active_month_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&MONTH_LINK)
        .filter_map(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}

/// Day links of a month table, restricted to `weekdays`
///
/// `month_link` is the link the month page was fetched from; its
/// `u_hyojiym=YYYYMM` parameter fixes the calendar the weekdays are
/// computed against.
pub fn day_links(html: &str, month_link: &str, weekdays: &[Weekday]) -> Vec<String> {
    let Some((year, month)) = year_month_of(month_link) else {
        tracing::warn!(month_link, "Month link has no u_hyojiym parameter");
        return Vec::new();
    };
    let target_days = days_of_week(year, month, weekdays);

    let document = Html::parse_document(html);
    document
        .select(&DAY_CELL)
        .filter_map(|cell| {
            let day: u32 = cell_text(&cell).parse().ok()?;
            if !target_days.contains(&day) {
                return None;
            }
            cell.select(&LINK)
                .next()
                .and_then(|link| link.value().attr("href"))
                .map(|href| href.trim().to_string())
        })
        .filter(|href| !href.is_empty())
        .collect()
}

/// Target of the link whose text is exactly `label`
pub fn purpose_link(html: &str, label: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&LINK)
        .find(|link| cell_text(link) == label)
        .and_then(|link| link.value().attr("href"))
        .map(|href| href.trim().to_string())
}

/// The booking form named `form_name`, with all named inputs
pub fn booking_form(html: &str, form_name: &str) -> Option<BookingForm> {
    let document = Html::parse_document(html);
    let form = document
        .select(&FORM)
        .find(|form| form.value().attr("name") == Some(form_name))?;

    let action = form.value().attr("action").unwrap_or_default().trim().to_string();
    let fields = form
        .select(&INPUT)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            if name.is_empty() {
                return None;
            }
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect();

    Some(BookingForm { action, fields })
}

/// Reservations listed on the held-reservation screen
///
/// The first row is a header. Each data row has the usage date and time in
/// its first cell (`2025年6月1日(日) 09:00〜11:00`, linked with `ymd=`) and
/// the facility name in its second.
pub fn held_reservations(html: &str) -> Vec<ReservationEntry> {
    let document = Html::parse_document(html);
    let Some(table) = document.select(&ANY_TABLE).next() else {
        tracing::info!("No held-reservation table found");
        return Vec::new();
    };

    let mut held = Vec::new();
    for row in table.select(&ROW).skip(1) {
        let cells: Vec<_> = row.select(&DATA_CELL).collect();
        if cells.len() < 2 {
            continue;
        }

        let ymd = cells[0]
            .select(&LINK)
            .next()
            .and_then(|link| link.value().attr("href"))
            .and_then(|href| query_param(href, "ymd"));
        let when = cell_text(&cells[0]);
        let time = start_time(&when);
        let facility = cell_text(&cells[1]);

        match (ymd, time) {
            (Some(ymd), Some(time)) => {
                held.push(ReservationEntry::single(facility, ymd, TimeSlot::open(time, None)));
            }
            _ => tracing::warn!(row = %when, facility = %facility, "Skipping unreadable held row"),
        }
    }
    held
}

/// Text between the first space and `〜`
fn start_time(text: &str) -> Option<String> {
    let start = text.find(' ')? + 1;
    let end = text[start..].find('〜')? + start;
    let time = text[start..end].trim();
    (!time.is_empty()).then(|| time.to_string())
}
