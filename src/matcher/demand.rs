//! Wish list matching against one day's availability
//!
//! For every wish list entry the matcher keeps the open slots on the wished
//! date, in the wished area and band, then trims them to the entry's quota
//! after counting what is already held. Results of all entries are merged
//! and ordered by area priority.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;

use super::compare::{relation_to_held, Relation};
use crate::models::{FacilityArea, ReservationEntry, TimeSlot, WishListEntry};
use crate::utils::parse_ymd;

/// Days from today (inclusive) during which bookings need the last-minute flag
pub const LAST_MINUTE_DAYS: i64 = 2;

/// An open slot selected for booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub facility_name: String,
    pub date: String,
    pub slot: TimeSlot,
    pub area: FacilityArea,
    pub relation: Relation,
}

impl Candidate {
    /// Booking priority, lower first
    pub fn priority(&self) -> u8 {
        self.area.priority()
    }

    /// Single-slot reservation this candidate would create
    pub fn to_entry(&self) -> ReservationEntry {
        ReservationEntry::single(&self.facility_name, &self.date, self.slot.clone())
    }

    fn key(&self) -> (String, String, String) {
        (
            self.facility_name.clone(),
            self.date.clone(),
            self.slot.clock_time.clone(),
        )
    }
}

/// Why a matching slot was not selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectReason {
    /// Held reservations already fill the quota
    QuotaExhausted,
    /// More slots matched than the quota leaves room for
    QuotaLimited,
    /// Date is too close to today and the entry does not allow last-minute bookings
    TooCloseToToday,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuotaExhausted => "quota_exhausted",
            Self::QuotaLimited => "quota_limited",
            Self::TooCloseToToday => "too_close_to_today",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A matching slot left out, with the reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub facility_name: String,
    pub date: String,
    pub clock_time: String,
    pub reason: RejectReason,
}

/// Candidates and rejections for one day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutcome {
    pub candidates: Vec<Candidate>,
    pub rejections: Vec<Rejection>,
}

impl MatchOutcome {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Whether `date` falls within the last-minute window starting `today`
///
/// Past dates are outside the window.
pub fn is_last_minute(today: NaiveDate, date: NaiveDate) -> bool {
    let days = (date - today).num_days();
    (0..=LAST_MINUTE_DAYS).contains(&days)
}

/// Slots satisfying one wish list entry
///
/// Candidates keep the order they appear in `day`.
pub fn match_wish(
    day: &[ReservationEntry],
    wish: &WishListEntry,
    held: &[ReservationEntry],
    today: NaiveDate,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();

    if !wish.is_actionable() {
        tracing::debug!(?wish, "Skipping wish entry without date or area");
        return outcome;
    }

    let area = wish.area();
    let mut matching: Vec<(&ReservationEntry, &TimeSlot)> = Vec::new();

    for entry in day {
        if entry.date != wish.date || entry.area() != area {
            continue;
        }
        let slots = entry.open_slots().filter(|slot| slot.band == wish.band);

        // Unreadable dates are kept rather than treated as last-minute
        let too_close = !wish.allow_last_minute
            && parse_ymd(&entry.date).is_some_and(|date| is_last_minute(today, date));
        if too_close {
            outcome.rejections.extend(
                slots.map(|slot| rejection(entry, slot, RejectReason::TooCloseToToday)),
            );
            continue;
        }

        matching.extend(slots.map(|slot| (entry, slot)));
    }

    if matching.is_empty() {
        return outcome;
    }

    let held_count = held
        .iter()
        .filter(|h| h.date == wish.date && h.area() == area)
        .flat_map(|h| h.slots.iter())
        .filter(|slot| slot.band == wish.band)
        .count();
    // One quota per wish entry, shared by every court row of the area
    let remaining = (wish.quota as usize).saturating_sub(held_count);

    if remaining == 0 {
        tracing::debug!(
            date = %wish.date,
            area = %area,
            band = %wish.band,
            held = held_count,
            "Quota exhausted by held reservations"
        );
        outcome.rejections.extend(
            matching
                .iter()
                .map(|(entry, slot)| rejection(entry, slot, RejectReason::QuotaExhausted)),
        );
        return outcome;
    }

    for (index, (entry, slot)) in matching.into_iter().enumerate() {
        if index < remaining {
            let mut candidate = Candidate {
                facility_name: entry.facility_name.clone(),
                date: entry.date.clone(),
                slot: slot.clone(),
                area,
                relation: Relation::Independent,
            };
            candidate.relation = relation_to_held(&candidate.to_entry(), held);
            outcome.candidates.push(candidate);
        } else {
            outcome
                .rejections
                .push(rejection(entry, slot, RejectReason::QuotaLimited));
        }
    }

    outcome
}

/// Candidates for one day across the whole wish list
///
/// A slot selected by several entries appears once. Candidates are ordered by
/// area priority; ties keep their relative order.
pub fn match_day(
    day: &[ReservationEntry],
    wishes: &[WishListEntry],
    held: &[ReservationEntry],
    today: NaiveDate,
) -> MatchOutcome {
    let mut outcome = MatchOutcome::default();
    let mut seen = HashSet::new();

    for wish in wishes {
        let matched = match_wish(day, wish, held, today);
        for candidate in matched.candidates {
            if seen.insert(candidate.key()) {
                outcome.candidates.push(candidate);
            }
        }
        outcome.rejections.extend(matched.rejections);
    }

    outcome.candidates.sort_by_key(Candidate::priority);

    for rejected in &outcome.rejections {
        tracing::info!(
            facility = %rejected.facility_name,
            date = %rejected.date,
            time = %rejected.clock_time,
            reason = %rejected.reason,
            "Slot not selected"
        );
    }

    outcome
}

fn rejection(entry: &ReservationEntry, slot: &TimeSlot, reason: RejectReason) -> Rejection {
    Rejection {
        facility_name: entry.facility_name.clone(),
        date: entry.date.clone(),
        clock_time: slot.clock_time.clone(),
        reason,
    }
}
