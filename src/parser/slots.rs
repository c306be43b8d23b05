//! Availability table extraction
//!
//! Turns one day's facility availability table into [`ReservationEntry`]
//! rows. The table looks like:
//!
//! ```text
//! | 施設          | 09:00 | 11:00 | 13:00 |
//! | 茅ヶ崎公園 1  |  <a>  |   ×   |   ○   |
//! ```
//!
//! The header row is recognized by its first cell; every later row is a
//! facility, and each of its cells becomes a [`TimeSlot`] labelled with the
//! matching header column.

use scraper::{ElementRef, Html};

use super::cell_text;
use super::selectors::{ANY_TABLE, CELL, LINK, LINK_TABLE, ROW};
use crate::models::{ReservationEntry, TimeSlot};

/// First-cell labels that mark the header row
const HEADER_SENTINELS: &[&str] = &["施設", "facility"];

/// Cell text that marks a slot as open without a link
const OPEN_MARKER: &str = "○";

fn is_header(first_cell: &str) -> bool {
    HEADER_SENTINELS
        .iter()
        .any(|sentinel| first_cell.eq_ignore_ascii_case(sentinel))
}

/// Parse one availability table for `date` (`YYYYMMDD`)
///
/// Rows before the header and rows whose cell count differs from the header
/// are skipped. A page without a table yields an empty list.
pub fn extract_slots(html: &str, date: &str) -> Vec<ReservationEntry> {
    let document = Html::parse_document(html);

    let Some(table) = document
        .select(&LINK_TABLE)
        .next()
        .or_else(|| document.select(&ANY_TABLE).next())
    else {
        tracing::info!(date, "No availability table found");
        return Vec::new();
    };

    let mut headers: Option<Vec<String>> = None;
    let mut entries = Vec::new();

    for row in table.select(&ROW) {
        let cells: Vec<ElementRef> = row.select(&CELL).collect();
        let Some(first) = cells.first() else {
            continue;
        };
        let first_text = cell_text(first);

        if is_header(&first_text) {
            headers = Some(cells[1..].iter().map(cell_text).collect());
            continue;
        }

        let Some(columns) = headers.as_ref() else {
            tracing::debug!(row = %first_text, "Skipping row before header");
            continue;
        };

        if cells.len() != columns.len() + 1 {
            tracing::debug!(
                facility = %first_text,
                cells = cells.len(),
                expected = columns.len() + 1,
                "Skipping row with mismatched cell count"
            );
            continue;
        }

        let mut entry = ReservationEntry::new(first_text, date);
        for (label, cell) in columns.iter().zip(&cells[1..]) {
            entry.slots.push(slot_from_cell(label, cell));
        }
        entries.push(entry);
    }

    tracing::debug!(date, facilities = entries.len(), "Extracted availability");
    entries
}

fn slot_from_cell(label: &str, cell: &ElementRef) -> TimeSlot {
    if let Some(link) = cell.select(&LINK).next() {
        let href = link
            .value()
            .attr("href")
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string);
        return TimeSlot::open(label, href);
    }

    if cell_text(cell) == OPEN_MARKER {
        TimeSlot::open(label, None)
    } else {
        TimeSlot::closed(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeBand;

    fn table(rows: &str) -> String {
        format!(r#"<html><body><table class="link-table">{rows}</table></body></html>"#)
    }

    #[test]
    fn test_english_header_scenario() {
        let html = table(
            "<tr><th>facility</th><th>09:00</th><th>15:00</th></tr>\
             <tr><td>Court A</td><td>○</td><td>×</td></tr>",
        );
        let entries = extract_slots(&html, "20250601");

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.facility_name, "Court A");
        assert_eq!(entry.date, "20250601");
        assert_eq!(entry.slots.len(), 2);
        assert!(entry.slots[0].is_open);
        assert_eq!(entry.slots[0].band, TimeBand::Morning);
        assert!(!entry.slots[1].is_open);
        assert_eq!(entry.slots[1].band, TimeBand::Afternoon);
    }

    #[test]
    fn test_link_cell_carries_action_ref() {
        let html = table(
            r#"<tr><th>施設</th><th>09:00</th><th>11:00</th></tr>
               <tr><td>茅ヶ崎公園 1コート</td>
                   <td><a href=" /cultos/reserve/gin_z_yoyaku?slot=1 ">○</a></td>
                   <td>×</td></tr>"#,
        );
        let entries = extract_slots(&html, "20250601");

        let slot = &entries[0].slots[0];
        assert!(slot.is_open);
        assert_eq!(
            slot.action_ref.as_deref(),
            Some("/cultos/reserve/gin_z_yoyaku?slot=1")
        );
        assert!(entries[0].slots[1].action_ref.is_none());
    }

    #[test]
    fn test_rows_before_header_and_mismatched_rows_skipped() {
        let html = table(
            "<tr><td>お知らせ</td></tr>\
             <tr><th>施設</th><th>09:00</th><th>11:00</th></tr>\
             <tr><td>A</td><td>○</td></tr>\
             <tr><td>B</td><td>○</td><td>○</td></tr>",
        );
        let entries = extract_slots(&html, "20250601");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].facility_name, "B");
    }

    #[test]
    fn test_repeated_header_resets_columns() {
        let html = table(
            "<tr><th>施設</th><th>09:00</th></tr>\
             <tr><td>A</td><td>○</td></tr>\
             <tr><th>施設</th><th>19:00</th><th>21:00</th></tr>\
             <tr><td>B</td><td>×</td><td>○</td></tr>",
        );
        let entries = extract_slots(&html, "20250601");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].slots[0].band, TimeBand::Night);
        assert_eq!(entries[1].slots[1].band, TimeBand::LateNight);
    }

    #[test]
    fn test_no_table_returns_empty() {
        assert!(extract_slots("<html><body><p>休館日</p></body></html>", "20250601").is_empty());
    }

    #[test]
    fn test_comments_ignored() {
        let html = table(
            "<!-- <tr><td>Ghost</td><td>○</td></tr> -->\
             <tr><th>施設</th><th>09:00</th></tr>\
             <tr><td>A</td><td>○</td></tr>",
        );
        let entries = extract_slots(&html, "20250601");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].facility_name, "A");
    }
}
