// Core data structures for the reservation engine

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::InputError;

/// Quota applied when a wish list entry names none
pub const DEFAULT_QUOTA: u32 = 100;

/// Coarse time-of-day bucket for a slot's start time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeBand {
    EarlyMorning,
    Morning,
    LateMorning,
    EarlyAfternoon,
    Afternoon,
    Evening,
    Night,
    LateNight,
    Unknown,
}

impl TimeBand {
    /// Classify a clock time such as `"09:00"`
    ///
    /// Unparsable input and hours outside [6, 22) yield `Unknown`.
    pub fn classify(clock_time: &str) -> Self {
        match parse_clock(clock_time) {
            Some((hour, _)) => Self::from_hour(hour),
            None => Self::Unknown,
        }
    }

    /// Band for a clock hour
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=7 => Self::EarlyMorning,
            8..=9 => Self::Morning,
            10..=11 => Self::LateMorning,
            12..=14 => Self::EarlyAfternoon,
            15 => Self::Afternoon,
            16..=18 => Self::Evening,
            19..=20 => Self::Night,
            21 => Self::LateNight,
            _ => Self::Unknown,
        }
    }

    /// Look up a band by its wish list short code
    ///
    /// # Errors
    ///
    /// Returns `InputError::UnknownBandCode` for any code outside the table.
    pub fn from_code(code: &str) -> Result<Self, InputError> {
        match code.trim() {
            "EAMO" => Ok(Self::EarlyMorning),
            "MO" => Ok(Self::Morning),
            "LAMO" => Ok(Self::LateMorning),
            "EAAF" => Ok(Self::EarlyAfternoon),
            "AF" => Ok(Self::Afternoon),
            "EV" => Ok(Self::Evening),
            "NI" => Ok(Self::Night),
            "LANI" => Ok(Self::LateNight),
            other => Err(InputError::UnknownBandCode(other.to_string())),
        }
    }

    /// Short code, `None` for `Unknown`
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::EarlyMorning => Some("EAMO"),
            Self::Morning => Some("MO"),
            Self::LateMorning => Some("LAMO"),
            Self::EarlyAfternoon => Some("EAAF"),
            Self::Afternoon => Some("AF"),
            Self::Evening => Some("EV"),
            Self::Night => Some("NI"),
            Self::LateNight => Some("LANI"),
            Self::Unknown => None,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EarlyMorning => "early_morning",
            Self::Morning => "morning",
            Self::LateMorning => "late_morning",
            Self::EarlyAfternoon => "early_afternoon",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
            Self::LateNight => "late_night",
            Self::Unknown => "unknown",
        }
    }

    /// All classifiable bands in clock order
    pub fn all() -> [Self; 8] {
        [
            Self::EarlyMorning,
            Self::Morning,
            Self::LateMorning,
            Self::EarlyAfternoon,
            Self::Afternoon,
            Self::Evening,
            Self::Night,
            Self::LateNight,
        ]
    }
}

impl fmt::Display for TimeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse `H:MM` / `HH:MM` into (hour, minute)
pub fn parse_clock(clock_time: &str) -> Option<(u32, u32)> {
    let (hour, minute) = clock_time.trim().split_once(':')?;
    let hour = hour.trim();
    let minute = minute.trim();
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

/// Physical facility grouping, inferred from a facility name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityArea {
    ChigasakiPark,
    SerizawaSportsPark,
    TsutsumiSportsPark,
    YanagishimaShiosaiPark,
    YanagishimaSportsPark,
    Other,
}

/// Areas in keyword scan order, ending with the catch-all
const AREA_TABLE: [FacilityArea; 6] = [
    FacilityArea::ChigasakiPark,
    FacilityArea::SerizawaSportsPark,
    FacilityArea::TsutsumiSportsPark,
    FacilityArea::YanagishimaShiosaiPark,
    FacilityArea::YanagishimaSportsPark,
    FacilityArea::Other,
];

impl FacilityArea {
    /// Identifier accepted verbatim as a wish list selector
    pub fn id(&self) -> &'static str {
        match self {
            Self::ChigasakiPark => "CHIGASAKI_PARK",
            Self::SerizawaSportsPark => "SERIZAWA_SPORTS_PARK",
            Self::TsutsumiSportsPark => "TSUTSUMI_SPORTS_PARK",
            Self::YanagishimaShiosaiPark => "YANAGISHIMA_SHIOSAI_PARK",
            Self::YanagishimaSportsPark => "YANAGISHIMA_SPORTS_PARK",
            Self::Other => "OTHER",
        }
    }

    /// Keyword matched against facility names
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::ChigasakiPark => "茅ヶ崎公園",
            Self::SerizawaSportsPark => "芹沢スポーツ広場",
            Self::TsutsumiSportsPark => "堤スポーツ広場",
            Self::YanagishimaShiosaiPark => "柳島しおさい公園",
            Self::YanagishimaSportsPark => "柳島スポーツ公園",
            Self::Other => "その他",
        }
    }

    /// Booking priority, lower is booked first
    pub fn priority(&self) -> u8 {
        match self {
            Self::ChigasakiPark => 1,
            Self::YanagishimaShiosaiPark => 2,
            Self::YanagishimaSportsPark => 3,
            Self::SerizawaSportsPark | Self::TsutsumiSportsPark => 4,
            Self::Other => 5,
        }
    }

    /// All areas in scan order
    pub fn all() -> &'static [Self] {
        &AREA_TABLE
    }

    /// Infer the area of a facility name by keyword containment
    pub fn from_facility_name(name: &str) -> Self {
        AREA_TABLE
            .iter()
            .copied()
            .find(|area| *area != Self::Other && name.contains(area.keyword()))
            .unwrap_or(Self::Other)
    }

    /// Resolve a wish list area selector
    ///
    /// An exact identifier wins, then keyword containment, then `Other`.
    pub fn resolve_selector(selector: &str) -> Self {
        let selector = selector.trim();
        if let Some(area) = AREA_TABLE.iter().find(|area| area.id() == selector) {
            return *area;
        }
        Self::from_facility_name(selector)
    }
}

impl fmt::Display for FacilityArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One bookable time column of a facility row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub clock_time: String,
    pub band: TimeBand,
    pub is_open: bool,
    /// Link to the booking page; only ever set on open slots
    pub action_ref: Option<String>,
}

impl TimeSlot {
    /// An open slot, optionally carrying its booking link
    pub fn open(clock_time: impl Into<String>, action_ref: Option<String>) -> Self {
        let clock_time = clock_time.into();
        Self {
            band: TimeBand::classify(&clock_time),
            clock_time,
            is_open: true,
            action_ref,
        }
    }

    /// A closed slot
    pub fn closed(clock_time: impl Into<String>) -> Self {
        let clock_time = clock_time.into();
        Self {
            band: TimeBand::classify(&clock_time),
            clock_time,
            is_open: false,
            action_ref: None,
        }
    }
}

/// A facility row on one date, used for both held and candidate reservations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationEntry {
    pub facility_name: String,
    /// `YYYYMMDD`
    pub date: String,
    pub slots: Vec<TimeSlot>,
}

impl ReservationEntry {
    pub fn new(facility_name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            facility_name: facility_name.into(),
            date: date.into(),
            slots: Vec::new(),
        }
    }

    /// Single-slot entry, as imported from the held list
    pub fn single(
        facility_name: impl Into<String>,
        date: impl Into<String>,
        slot: TimeSlot,
    ) -> Self {
        let mut entry = Self::new(facility_name, date);
        entry.slots.push(slot);
        entry
    }

    /// Inferred facility area
    pub fn area(&self) -> FacilityArea {
        FacilityArea::from_facility_name(&self.facility_name)
    }

    /// Open slots only
    pub fn open_slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter().filter(|slot| slot.is_open)
    }
}

/// A user-declared booking target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishListEntry {
    /// `YYYYMMDD`
    pub date: String,
    pub band: TimeBand,
    pub area_selector: String,
    pub quota: u32,
    pub allow_last_minute: bool,
}

impl WishListEntry {
    pub fn new(date: impl Into<String>, band: TimeBand, area_selector: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            band,
            area_selector: area_selector.into(),
            quota: DEFAULT_QUOTA,
            allow_last_minute: false,
        }
    }

    pub fn with_quota(mut self, quota: u32) -> Self {
        self.quota = quota;
        self
    }

    pub fn with_last_minute(mut self, allow: bool) -> Self {
        self.allow_last_minute = allow;
        self
    }

    /// Entries with a blank date or selector are ignored by matching
    pub fn is_actionable(&self) -> bool {
        !self.date.trim().is_empty() && !self.area_selector.trim().is_empty()
    }

    /// Resolved target area
    pub fn area(&self) -> FacilityArea {
        FacilityArea::resolve_selector(&self.area_selector)
    }
}

/// A date on which no matching happens, normalized to `YYYYMMDD`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExclusionDate(String);

impl ExclusionDate {
    /// Normalize `YYYYMMDD` or `MMDD` (implying `current_year`)
    ///
    /// Any other shape yields `None`.
    pub fn parse(raw: &str, current_year: i32) -> Option<Self> {
        let raw = raw.trim();
        if !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match raw.len() {
            8 => Some(Self(raw.to_string())),
            4 => Some(Self(format!("{current_year:04}{raw}"))),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, ymd: &str) -> bool {
        self.0 == ymd
    }
}

impl fmt::Display for ExclusionDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one booking attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub facility: String,
    pub date: String,
    pub slot: TimeSlot,
    pub succeeded: bool,
}

/// Login credential for the configured account
#[derive(Clone, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub name: String,
    pub id: String,
    pub pass: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("pass", &"***")
            .finish()
    }
}
