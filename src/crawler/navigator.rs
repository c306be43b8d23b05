//! Session state machine for the reservation site
//!
//! The site only works when its screens are requested in a fixed order with
//! the session id and a running screen index attached:
//!
//! ```text
//! Init -> LoggedIn -> Categorized -> FirstSelected -> DataTabReached -> CalendarFetched
//!   per month: MonthFetched
//!     per day: DayFetched -> DayIframeFetched -> FacilityIframeFetched -> [BookingAttempted]
//! ```
//!
//! Every screen is checked for the site's error fragments and for an empty
//! body. Setup screens map failures to [`Error::Session`]; day screens return
//! the [`NavigationError`] for the coordinator to record.

use chrono::{NaiveDate, Weekday};

use super::url::{rewrite_day_link, SiteUrls};
use super::Transport;
use crate::config::SiteConfig;
use crate::error::Error;
use crate::matcher::{match_day, Candidate, Rejection};
use crate::models::{BookingOutcome, Credential, ReservationEntry, WishListEntry};
use crate::parser;
use crate::utils::error::{NavigationError, ScreenError};

/// Position of the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    /// Nothing requested yet
    Start,
    Init,
    LoggedIn,
    Categorized,
    FirstSelected,
    DataTabReached,
    CalendarFetched,
    MonthFetched,
    DayFetched,
    DayIframeFetched,
    FacilityIframeFetched,
    BookingAttempted,
}

/// Request parameters threaded through the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
    /// Base function code; the category screen is posted with `function_code + 1`
    pub function_code: u32,
    /// Running screen index, advanced when the first-selection screen is opened
    pub index: u32,
}

/// Result of one day's walk
#[derive(Debug, Default)]
pub struct DayReport {
    pub date: String,
    pub candidates: usize,
    pub outcomes: Vec<BookingOutcome>,
    pub rejections: Vec<Rejection>,
}

/// Drives one logged-in session over a transport
pub struct SessionNavigator<'a> {
    transport: &'a dyn Transport,
    site: &'a SiteConfig,
    urls: SiteUrls,
    weekdays: Vec<Weekday>,
    state: NavState,
    ctx: SessionContext,
    dry_run: bool,
}

impl<'a> SessionNavigator<'a> {
    /// # Errors
    ///
    /// Returns `NavigationError::InvalidLink` if the configured root URL is invalid
    pub fn new(
        transport: &'a dyn Transport,
        site: &'a SiteConfig,
        weekdays: Vec<Weekday>,
    ) -> Result<Self, NavigationError> {
        Ok(Self {
            transport,
            urls: SiteUrls::new(&site.root_url)?,
            weekdays,
            state: NavState::Start,
            ctx: SessionContext {
                session_id: String::new(),
                function_code: site.function_code,
                index: site.index_start,
            },
            site,
            dry_run: false,
        })
    }

    /// Walk and match without submitting booking forms
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    fn advance(&mut self, state: NavState) {
        tracing::debug!(from = ?self.state, to = ?state, "Navigation transition");
        self.state = state;
    }

    /// Reject error screens and empty bodies
    fn check(&self, screen: &str, body: Option<String>) -> Result<String, ScreenError> {
        let body = match body {
            Some(body) if !body.trim().is_empty() => body,
            _ => return Err(ScreenError::empty(screen)),
        };
        if let Some(marker) = self
            .site
            .error_markers
            .iter()
            .find(|marker| body.contains(marker.as_str()))
        {
            return Err(ScreenError::marker(screen, marker.as_str()));
        }
        Ok(body)
    }

    async fn get_screen(&self, screen: &str, url: &str) -> Result<String, NavigationError> {
        let body = self.transport.get(url).await?;
        Ok(self.check(screen, body)?)
    }

    async fn post_screen(
        &self,
        screen: &str,
        url: &str,
        form: &[(String, String)],
    ) -> Result<String, NavigationError> {
        let body = self.transport.post(url, form).await?;
        Ok(self.check(screen, body)?)
    }

    fn session_param(&self) -> (&str, String) {
        (self.site.session_param.as_str(), self.ctx.session_id.clone())
    }

    /// Open the site and pick up a session id
    pub async fn init(&mut self) -> Result<(), NavigationError> {
        let url = self.urls.screen(&self.site.init_path, &[])?;
        let body = self.get_screen("init", &url).await?;

        self.ctx.session_id = parser::extract_session_id(&body, &self.site.session_param)
            .ok_or_else(|| ScreenError::missing("init", self.site.session_param.as_str()))?;
        self.ctx.function_code = self.site.function_code;
        self.ctx.index = self.site.index_start;
        self.advance(NavState::Init);
        Ok(())
    }

    pub async fn login(&mut self, credential: &Credential) -> Result<(), NavigationError> {
        let url = self.urls.screen(&self.site.login_path, &[])?;
        let form = vec![
            (self.site.function_param.clone(), self.ctx.function_code.to_string()),
            (self.site.login_id_field.clone(), credential.id.clone()),
            (self.site.login_password_field.clone(), credential.pass.clone()),
            (self.site.session_param.clone(), self.ctx.session_id.clone()),
        ];
        self.post_screen("login", &url, &form).await?;
        self.advance(NavState::LoggedIn);
        Ok(())
    }

    pub async fn categorize(&mut self) -> Result<(), NavigationError> {
        let url = self
            .urls
            .screen(&self.site.category_path, &[self.session_param()])?;
        let form = vec![
            (
                self.site.function_param.clone(),
                (self.ctx.function_code + 1).to_string(),
            ),
            (self.site.index_param.clone(), self.ctx.index.to_string()),
        ];
        self.post_screen("category", &url, &form).await?;
        self.advance(NavState::Categorized);
        Ok(())
    }

    pub async fn first_selection(&mut self) -> Result<(), NavigationError> {
        self.ctx.index += 1;
        let url = self.urls.screen(
            &self.site.first_selection_path,
            &[
                (self.site.index_param.as_str(), self.ctx.index.to_string()),
                (self.site.category_param.as_str(), self.site.category_code.clone()),
                self.session_param(),
            ],
        )?;
        self.get_screen("first selection", &url).await?;
        self.advance(NavState::FirstSelected);
        Ok(())
    }

    /// Open the date tab, returning its page
    pub async fn date_tab(&mut self) -> Result<String, NavigationError> {
        let url = self.urls.screen(
            &self.site.first_selection_path,
            &[
                (self.site.function_param.as_str(), self.ctx.function_code.to_string()),
                (self.site.index_param.as_str(), self.ctx.index.to_string()),
                (self.site.tab_param.as_str(), self.site.date_tab.clone()),
                self.session_param(),
            ],
        )?;
        let body = self.get_screen("date tab", &url).await?;
        self.advance(NavState::DataTabReached);
        Ok(body)
    }

    /// Follow the date tab's iframe to the calendar
    pub async fn calendar(&mut self, date_tab: &str) -> Result<String, NavigationError> {
        let src = parser::first_iframe_src(date_tab)
            .ok_or_else(|| ScreenError::missing("date tab", "calendar iframe"))?;
        let body = self.get_screen("calendar", &self.urls.resolve(&src)?).await?;
        self.advance(NavState::CalendarFetched);
        Ok(body)
    }

    /// Log in and walk to the calendar, returning the calendar page
    ///
    /// # Errors
    ///
    /// Any failure is an [`Error::Session`] naming the step that failed.
    pub async fn open_calendar(&mut self, credential: &Credential) -> Result<String, Error> {
        self.init().await.map_err(|e| Error::session("init", e))?;
        self.login(credential).await.map_err(|e| Error::session("login", e))?;
        self.categorize()
            .await
            .map_err(|e| Error::session("category", e))?;
        self.first_selection()
            .await
            .map_err(|e| Error::session("first selection", e))?;
        let tab = self
            .date_tab()
            .await
            .map_err(|e| Error::session("date tab", e))?;
        self.calendar(&tab)
            .await
            .map_err(|e| Error::session("calendar", e))
    }

    /// Log in and read the reservations the account already holds
    ///
    /// # Errors
    ///
    /// Any failure is an [`Error::Session`] naming the step that failed.
    pub async fn held_reservations(
        &mut self,
        credential: &Credential,
    ) -> Result<Vec<ReservationEntry>, Error> {
        self.init().await.map_err(|e| Error::session("init", e))?;
        self.login(credential).await.map_err(|e| Error::session("login", e))?;

        let url = self
            .urls
            .screen(&self.site.held_list_path, &[self.session_param()])
            .map_err(|e| Error::session("held list", e))?;
        let body = self
            .get_screen("held list", &url)
            .await
            .map_err(|e| Error::session("held list", e))?;

        let held = parser::held_reservations(&body);
        tracing::info!(count = held.len(), "Loaded held reservations");
        Ok(held)
    }

    /// Day links of one month, filtered to the configured weekdays
    pub async fn month_days(&mut self, month_link: &str) -> Result<Vec<String>, NavigationError> {
        let body = self
            .get_screen("month", &self.urls.resolve(month_link)?)
            .await?;
        self.advance(NavState::MonthFetched);

        let days = parser::day_links(&body, month_link, &self.weekdays);
        tracing::debug!(month_link, days = days.len(), "Fetched month");
        Ok(days)
    }

    /// Second-stage form of a day link
    pub fn day_link(&self, link: &str) -> String {
        rewrite_day_link(
            link,
            &self.site.day_stage_from,
            &self.site.day_stage_to,
            &self.site.index_param,
        )
    }

    /// Walk a day's screens down to its facility availability
    pub async fn day_availability(
        &mut self,
        day_link: &str,
        date: &str,
    ) -> Result<Vec<ReservationEntry>, NavigationError> {
        let day_page = self.get_screen("day", &self.urls.resolve(day_link)?).await?;
        self.advance(NavState::DayFetched);

        let src = parser::first_iframe_src(&day_page)
            .ok_or_else(|| ScreenError::missing("day", "iframe"))?;
        let day_frame = self.get_screen("day iframe", &self.urls.resolve(&src)?).await?;
        self.advance(NavState::DayIframeFetched);

        let purpose = parser::purpose_link(&day_frame, &self.site.purpose_label)
            .ok_or_else(|| ScreenError::missing("day iframe", self.site.purpose_label.as_str()))?;
        let facility_page = self
            .get_screen("facility", &self.urls.resolve(&purpose)?)
            .await?;

        let src = parser::first_iframe_src(&facility_page)
            .ok_or_else(|| ScreenError::missing("facility", "iframe"))?;
        let table = self
            .get_screen("facility iframe", &self.urls.resolve(&src)?)
            .await?;
        self.advance(NavState::FacilityIframeFetched);

        Ok(parser::extract_slots(&table, date))
    }

    /// Submit the booking form behind one candidate slot
    ///
    /// Never fails: a rejected or unreachable booking is a not-succeeded
    /// outcome.
    pub async fn book(&mut self, candidate: &Candidate) -> BookingOutcome {
        let succeeded = match self.submit(candidate).await {
            Ok(true) => true,
            Ok(false) => false,
            Err(e) => {
                tracing::warn!(
                    facility = %candidate.facility_name,
                    date = %candidate.date,
                    time = %candidate.slot.clock_time,
                    error = %e,
                    "Booking failed"
                );
                false
            }
        };
        self.advance(NavState::BookingAttempted);

        BookingOutcome {
            facility: candidate.facility_name.clone(),
            date: candidate.date.clone(),
            slot: candidate.slot.clone(),
            succeeded,
        }
    }

    async fn submit(&self, candidate: &Candidate) -> Result<bool, NavigationError> {
        let Some(action_ref) = candidate.slot.action_ref.as_deref() else {
            tracing::warn!(
                facility = %candidate.facility_name,
                time = %candidate.slot.clock_time,
                "Open slot has no booking link"
            );
            return Ok(false);
        };

        let page = self
            .get_screen("booking page", &self.urls.resolve(action_ref)?)
            .await?;
        let form = parser::booking_form(&page, &self.site.booking_form_name).ok_or_else(|| {
            ScreenError::missing("booking page", format!("form {}", self.site.booking_form_name))
        })?;

        if self.dry_run {
            tracing::info!(
                facility = %candidate.facility_name,
                date = %candidate.date,
                time = %candidate.slot.clock_time,
                action = %form.action,
                "Dry run, booking form not submitted"
            );
            return Ok(false);
        }

        self.post_screen("booking submit", &self.urls.resolve(&form.action)?, &form.fields)
            .await?;
        Ok(true)
    }

    /// Walk one day, match it against the wish list, and book the matches
    ///
    /// Successful bookings are appended to `held` before the next candidate
    /// is tried, and to `successes`.
    pub async fn process_day(
        &mut self,
        day_link: &str,
        date: &str,
        wishes: &[WishListEntry],
        held: &mut Vec<ReservationEntry>,
        successes: &mut Vec<BookingOutcome>,
        today: NaiveDate,
    ) -> Result<DayReport, NavigationError> {
        let availability = self.day_availability(day_link, date).await?;
        let matched = match_day(&availability, wishes, held, today);

        let mut report = DayReport {
            date: date.to_string(),
            candidates: matched.candidates.len(),
            rejections: matched.rejections,
            ..DayReport::default()
        };

        for candidate in &matched.candidates {
            tracing::info!(
                facility = %candidate.facility_name,
                date = %candidate.date,
                time = %candidate.slot.clock_time,
                relation = candidate.relation.as_str(),
                priority = candidate.priority(),
                "Attempting booking"
            );

            let outcome = self.book(candidate).await;
            if outcome.succeeded {
                held.push(candidate.to_entry());
                successes.push(outcome.clone());
            }
            report.outcomes.push(outcome);
        }

        Ok(report)
    }
}
