//! URL handling for the reservation site
//!
//! Links on the site are root-relative and carry all screen state in their
//! query strings. This module resolves them against the site root, reads
//! individual parameters back out, and applies the fixed rewrites the walk
//! needs (second-stage day links, the synthetic previous month).

use chrono::{Datelike, NaiveDate};
use url::Url;

use crate::utils::error::NavigationError;

/// Base used to read query parameters out of relative links
const PARSE_BASE: &str = "http://localhost/";

/// Parameter carrying the displayed year and month (`YYYYMM`)
pub const MONTH_PARAM: &str = "u_hyojiym";

/// Parameter carrying a day (`YYYYMMDD`)
pub const DATE_PARAM: &str = "ymd";

/// Resolves site links and builds screen URLs against the site root
#[derive(Debug, Clone)]
pub struct SiteUrls {
    root: Url,
}

impl SiteUrls {
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidLink` if `root` is not an absolute URL
    pub fn new(root: &str) -> Result<Self, NavigationError> {
        let root = Url::parse(root)
            .map_err(|e| NavigationError::InvalidLink(format!("{root}: {e}")))?;
        Ok(Self { root })
    }

    /// Resolve a link found on a screen
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidLink` if the link cannot be joined
    pub fn resolve(&self, link: &str) -> Result<String, NavigationError> {
        self.root
            .join(link.trim())
            .map(String::from)
            .map_err(|e| NavigationError::InvalidLink(format!("{link}: {e}")))
    }

    /// Screen URL with query parameters appended in order
    ///
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidLink` if `path` cannot be joined
    pub fn screen(&self, path: &str, params: &[(&str, String)]) -> Result<String, NavigationError> {
        let mut url = self
            .root
            .join(path)
            .map_err(|e| NavigationError::InvalidLink(format!("{path}: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }
}

/// Value of query parameter `name` in a possibly relative link
pub fn query_param(link: &str, name: &str) -> Option<String> {
    let base = Url::parse(PARSE_BASE).ok()?;
    let url = base.join(link.trim()).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// `YYYYMMDD` date a day link points at
pub fn date_of(link: &str) -> Option<String> {
    query_param(link, DATE_PARAM)
}

/// Year and month a month link displays
pub fn year_month_of(link: &str) -> Option<(i32, u32)> {
    let ym = query_param(link, MONTH_PARAM)?;
    let ym = ym.get(..6)?;
    if !ym.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = ym[..4].parse().ok()?;
    let month: u32 = ym[4..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).map(|_| (year, month))
}

/// The same month link shifted one month back
///
/// Returns `None` if the link has no readable `u_hyojiym`.
pub fn shift_month_back(link: &str) -> Option<String> {
    let (year, month) = year_month_of(link)?;
    let previous = NaiveDate::from_ymd_opt(year, month, 1)?.checked_sub_months(chrono::Months::new(1))?;

    let needle = format!("{MONTH_PARAM}=");
    let start = link.find(&needle)? + needle.len();
    let end = start + 6;
    if link.len() < end {
        return None;
    }
    Some(format!(
        "{}{:04}{:02}{}",
        &link[..start],
        previous.year(),
        previous.month(),
        &link[end..]
    ))
}

/// Rewrite a first-stage day link into its second-stage form
///
/// `stage_from` is replaced by `stage_to`, and an `index_param` value of
/// exactly `4` becomes `2`. Applying it twice changes nothing.
pub fn rewrite_day_link(link: &str, stage_from: &str, stage_to: &str, index_param: &str) -> String {
    let link = if stage_from.is_empty() {
        link.to_string()
    } else {
        link.replace(stage_from, stage_to)
    };

    let needle = format!("{index_param}=4");
    let mut out = String::with_capacity(link.len());
    let mut rest = link.as_str();
    while let Some(pos) = rest.find(&needle) {
        let value_at = pos + needle.len() - 1;
        let after = &rest[pos + needle.len()..];
        out.push_str(&rest[..value_at]);
        if after.starts_with(|c: char| c.is_ascii_digit()) {
            out.push('4');
        } else {
            out.push('2');
        }
        rest = after;
    }
    out.push_str(rest);
    out
}
