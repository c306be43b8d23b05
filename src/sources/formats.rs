//! Text formats of the user supplied input files

use std::collections::HashMap;

use crate::models::{
    Credential, ExclusionDate, ReservationEntry, TimeBand, TimeSlot, WishListEntry, DEFAULT_QUOTA,
};
use crate::utils::error::InputError;

/// Marker appended to the area segment to allow last-minute booking
const LAST_MINUTE_MARKER: &str = "-OK";

/// Facility name given to rows of the held-reservations CSV
pub const HELD_CSV_COURT_SUFFIX: &str = " 1コート";

/// Parse the wish list
///
/// Entries are comma separated, one or more per line, each shaped
/// `YYYYMMDD/BAND/AREA[-OK][/QUOTA]`.
///
/// An entry with a quota of `0` can never book and is dropped with a
/// warning.
///
/// # Errors
///
/// Any malformed entry fails the whole list.
///
/// # Examples
///
/// ```
/// use yoyaku::sources::parse_wish_list;
///
/// let wishes = parse_wish_list("20250607/MO/茅ヶ崎公園-ok/2").unwrap();
/// assert_eq!(wishes[0].quota, 2);
/// assert!(wishes[0].allow_last_minute);
/// ```
pub fn parse_wish_list(text: &str) -> Result<Vec<WishListEntry>, InputError> {
    text.lines()
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_wish_entry)
        .filter_map(Result::transpose)
        .collect()
}

fn parse_wish_entry(entry: &str) -> Result<Option<WishListEntry>, InputError> {
    let parts: Vec<&str> = entry.split('/').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(InputError::MalformedWishEntry {
            entry: entry.to_string(),
            reason: format!("expected 3 or 4 '/' separated segments, found {}", parts.len()),
        });
    }

    let band = TimeBand::from_code(parts[1])?;
    let (area, allow_last_minute) = strip_last_minute_marker(parts[2]);

    let quota = match parts.get(3) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(0) => {
                tracing::warn!(entry, "Dropping wish list entry with zero quota");
                return Ok(None);
            }
            Ok(quota) => quota,
            Err(_) => return Err(InputError::InvalidQuota(raw.to_string())),
        },
        None => DEFAULT_QUOTA,
    };

    Ok(Some(
        WishListEntry::new(parts[0], band, area)
            .with_quota(quota)
            .with_last_minute(allow_last_minute),
    ))
}

/// Remove every case-insensitive `-OK` from the area segment
fn strip_last_minute_marker(raw: &str) -> (String, bool) {
    let upper = raw.to_ascii_uppercase();
    if !upper.contains(LAST_MINUTE_MARKER) {
        return (raw.to_string(), false);
    }

    let mut area = String::with_capacity(raw.len());
    let mut rest = raw;
    let mut rest_upper = upper.as_str();
    while let Some(pos) = rest_upper.find(LAST_MINUTE_MARKER) {
        area.push_str(&rest[..pos]);
        rest = &rest[pos + LAST_MINUTE_MARKER.len()..];
        rest_upper = &rest_upper[pos + LAST_MINUTE_MARKER.len()..];
    }
    area.push_str(rest);
    (area.trim().to_string(), true)
}

/// Parse the exclusion list
///
/// Comma separated `YYYYMMDD` or `MMDD` values; anything else is ignored.
pub fn parse_exclusions(text: &str, current_year: i32) -> Vec<ExclusionDate> {
    text.lines()
        .flat_map(|line| line.split(','))
        .filter_map(|raw| {
            let parsed = ExclusionDate::parse(raw, current_year);
            if parsed.is_none() && !raw.trim().is_empty() {
                tracing::warn!(value = raw.trim(), "Ignoring unreadable exclusion date");
            }
            parsed
        })
        .collect()
}

/// Parse the externally held reservations CSV
///
/// Rows are `area,YYYYMMDD,HH:MM`. Rows without exactly three fields are
/// skipped.
pub fn parse_held_csv(text: &str) -> Vec<ReservationEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let [area, date, time] = fields.as_slice() else {
                tracing::warn!(line, "Skipping held reservation row");
                return None;
            };
            Some(ReservationEntry::single(
                format!("{area}{HELD_CSV_COURT_SUFFIX}"),
                *date,
                TimeSlot::open(*time, None),
            ))
        })
        .collect()
}

/// Pick the first credential of `group` from the credential JSON
///
/// The file maps group names to lists of `{name, id, pass}` objects.
pub fn parse_credentials(json: &str, group: &str) -> Result<Credential, InputError> {
    let mut groups: HashMap<String, Vec<Credential>> = serde_json::from_str(json)?;
    groups
        .remove(group)
        .and_then(|list| list.into_iter().next())
        .ok_or_else(|| InputError::CredentialMissing(group.to_string()))
}
