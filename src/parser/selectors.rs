//! CSS selectors for the reservation site's screens
//!
//! The site renders every screen as server-side HTML with a handful of stable
//! hooks: the `link-table` class on availability and day tables, the
//! `MonthTbl` id on the month strip, and a named booking form.

use lazy_static::lazy_static;
use scraper::Selector;

// Helper macro to parse selectors safely at compile time
macro_rules! parse_selector {
    ($s:expr) => {
        Selector::parse($s).expect(concat!("Invalid CSS selector: ", $s))
    };
}

lazy_static! {
    /// Availability table, preferred over any other table on the page
    pub(crate) static ref LINK_TABLE: Selector = parse_selector!("table.link-table");

    /// Fallback when the class hook is missing
    pub(crate) static ref ANY_TABLE: Selector = parse_selector!("table");

    pub(crate) static ref ROW: Selector = parse_selector!("tr");

    /// Header and data cells in document order
    pub(crate) static ref CELL: Selector = parse_selector!("td, th");

    pub(crate) static ref DATA_CELL: Selector = parse_selector!("td");

    pub(crate) static ref LINK: Selector = parse_selector!("a");

    pub(crate) static ref IFRAME: Selector = parse_selector!("iframe");

    /// Month strip cells on the calendar screen
    pub(crate) static ref MONTH_LINK: Selector = parse_selector!("table#MonthTbl td a");

    /// Day cells of a month table
    pub(crate) static ref DAY_CELL: Selector = parse_selector!("table.link-table td");

    pub(crate) static ref FORM: Selector = parse_selector!("form");

    pub(crate) static ref INPUT: Selector = parse_selector!("input");
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_selectors_compile() {
        let html = Html::parse_document(
            r#"<table id="MonthTbl"><tr><td><a href="/m?u_hyojiym=202506">6月</a></td></tr></table>"#,
        );
        assert_eq!(html.select(&MONTH_LINK).count(), 1);
        assert_eq!(html.select(&ANY_TABLE).count(), 1);
        assert_eq!(html.select(&LINK_TABLE).count(), 0);
        assert_eq!(html.select(&CELL).count(), 1);
    }
}
