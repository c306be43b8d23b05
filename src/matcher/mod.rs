//! Demand matching and reservation comparison
//!
//! - [`compare`] - overlap, adjacency and extension checks between reservations
//! - [`demand`] - selection of bookable slots from availability and the wish list

pub mod compare;
pub mod demand;

pub use compare::{adjacent, is_additional_reservation, overlaps, same_area, Relation};
pub use demand::{match_day, match_wish, Candidate, MatchOutcome, RejectReason, Rejection};
