//! HTML parsing and data extraction
//!
//! This module turns the reservation site's screens into structured data:
//! availability tables become [`crate::models::ReservationEntry`] rows, and
//! the navigation screens yield links, forms and the held-reservation list.

pub mod screens;
pub mod selectors;
pub mod slots;

pub use screens::{
    active_month_links, booking_form, day_links, extract_session_id, first_iframe_src,
    held_reservations, purpose_link, BookingForm,
};
pub use slots::extract_slots;

use scraper::ElementRef;

use crate::utils::normalize_whitespace;

/// Whitespace-normalized text content of an element
pub(crate) fn cell_text(element: &ElementRef) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}
