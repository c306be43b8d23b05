//! Relationships between held and candidate reservations
//!
//! Every slot is treated as a fixed two-hour window starting at its clock
//! time. Times that cannot be parsed never overlap and are never adjacent.

use crate::models::{parse_clock, ReservationEntry};

/// Length of one booked slot
pub const SLOT_MINUTES: u32 = 120;

/// Largest gap between two windows that still counts as back-to-back
pub const ADJACENT_GAP_MINUTES: u32 = 30;

/// Minutes since midnight
fn minutes(clock_time: &str) -> Option<u32> {
    parse_clock(clock_time).map(|(h, m)| h * 60 + m)
}

/// Same inferred facility area
pub fn same_area(a: &ReservationEntry, b: &ReservationEntry) -> bool {
    a.area() == b.area()
}

/// Same `YYYYMMDD` date
pub fn same_date(a: &ReservationEntry, b: &ReservationEntry) -> bool {
    a.date == b.date
}

/// Whether the two-hour windows starting at `a` and `b` intersect
pub fn overlaps(a: &str, b: &str) -> bool {
    let (Some(start_a), Some(start_b)) = (minutes(a), minutes(b)) else {
        return false;
    };
    start_a < start_b + SLOT_MINUTES && start_b < start_a + SLOT_MINUTES
}

/// Whether one window starts within 30 minutes after the other ends
///
/// Order-independent.
pub fn adjacent(a: &str, b: &str) -> bool {
    let (Some(start_a), Some(start_b)) = (minutes(a), minutes(b)) else {
        return false;
    };
    let (earlier, later) = if start_a <= start_b {
        (start_a, start_b)
    } else {
        (start_b, start_a)
    };
    let end = earlier + SLOT_MINUTES;
    later >= end && later - end <= ADJACENT_GAP_MINUTES
}

/// Whether `candidate` extends `existing`
///
/// Same date, same area, and at least one slot pair overlapping or
/// back-to-back.
pub fn is_additional_reservation(existing: &ReservationEntry, candidate: &ReservationEntry) -> bool {
    if !same_date(existing, candidate) || !same_area(existing, candidate) {
        return false;
    }
    existing.slots.iter().any(|held| {
        candidate.slots.iter().any(|slot| {
            overlaps(&held.clock_time, &slot.clock_time) || adjacent(&held.clock_time, &slot.clock_time)
        })
    })
}

/// Whether `candidate` overlaps `existing` in a different area on the same day
pub fn clashes_elsewhere(existing: &ReservationEntry, candidate: &ReservationEntry) -> bool {
    if !same_date(existing, candidate) || same_area(existing, candidate) {
        return false;
    }
    existing.slots.iter().any(|held| {
        candidate
            .slots
            .iter()
            .any(|slot| overlaps(&held.clock_time, &slot.clock_time))
    })
}

/// How a candidate relates to what is already held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Extends a held reservation in the same area
    Extension,
    /// Overlaps a held reservation in another area
    ClashesElsewhere,
    /// Unrelated to anything held
    Independent,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::ClashesElsewhere => "clashes_elsewhere",
            Self::Independent => "independent",
        }
    }
}

/// Classify `candidate` against every held reservation
///
/// An extension wins over a clash.
pub fn relation_to_held(candidate: &ReservationEntry, held: &[ReservationEntry]) -> Relation {
    if held.iter().any(|h| is_additional_reservation(h, candidate)) {
        Relation::Extension
    } else if held.iter().any(|h| clashes_elsewhere(h, candidate)) {
        Relation::ClashesElsewhere
    } else {
        Relation::Independent
    }
}
