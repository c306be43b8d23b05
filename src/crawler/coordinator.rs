//! One booking run over every open month and day
//!
//! A run uses two independent logins: the first only reads the account's
//! held reservations, the second walks the calendar and books. Months are
//! visited in random order, days in calendar order.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Weekday};
use rand::seq::SliceRandom;

use super::navigator::{DayReport, SessionNavigator};
use super::url::{date_of, shift_month_back};
use super::Transport;
use crate::config::SiteConfig;
use crate::error::{Error, Result, YoyakuErrorTrait};
use crate::matcher::RejectReason;
use crate::models::{BookingOutcome, ExclusionDate, ReservationEntry};
use crate::notifications::{booking_message, deliver, Notifier};
use crate::parser::active_month_links;
use crate::sources::InputSource;

/// What a run did
#[derive(Debug, Default)]
pub struct RunReport {
    /// Bookings that went through, in booking order
    pub successes: Vec<BookingOutcome>,

    /// Booking forms fetched, successful or not
    pub attempts: usize,

    /// Days walked to the facility table
    pub days_visited: usize,

    /// Failures that skipped a month or a day
    pub errors: Vec<Error>,

    /// Matcher rejections per reason
    pub rejection_tally: BTreeMap<RejectReason, usize>,
}

impl RunReport {
    /// Keep a non-fatal error, hand a fatal one back
    fn record(&mut self, error: Error) -> Result<()> {
        if error.is_fatal_to_run() {
            return Err(error);
        }
        self.errors.push(error);
        Ok(())
    }

    fn absorb_day(&mut self, day: DayReport) {
        self.days_visited += 1;
        self.attempts += day.outcomes.len();
        for rejection in &day.rejections {
            *self.rejection_tally.entry(rejection.reason).or_default() += 1;
        }
    }
}

/// Runs the held-list session and the booking session
pub struct RunCoordinator {
    transport: Box<dyn Transport>,
    site: SiteConfig,
    weekdays: Vec<Weekday>,
    notifier: Arc<dyn Notifier>,
    dry_run: bool,
}

impl RunCoordinator {
    pub fn new(
        transport: Box<dyn Transport>,
        site: SiteConfig,
        weekdays: Vec<Weekday>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            transport,
            site,
            weekdays,
            notifier,
            dry_run: false,
        }
    }

    /// Match and walk without submitting booking forms
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn navigator(&self) -> Result<SessionNavigator<'_>> {
        let navigator =
            SessionNavigator::new(self.transport.as_ref(), &self.site, self.weekdays.clone())
                .map_err(|e| Error::config(format!("root_url unusable: {e}")))?;
        Ok(navigator.with_dry_run(self.dry_run))
    }

    /// Execute one run
    ///
    /// # Errors
    ///
    /// Fails on unreadable credentials or wish list and on any failure of
    /// the two login sessions. Month and day failures are collected in
    /// [`RunReport::errors`] instead.
    pub async fn run(&self, inputs: &dyn InputSource, today: NaiveDate) -> Result<RunReport> {
        let credential = inputs.credential()?;

        let mut held = self.navigator()?.held_reservations(&credential).await?;

        let wishes = inputs.wish_list()?;
        let exclusions = inputs.exclusions(today.year())?;
        let extra = inputs.extra_held()?;
        tracing::info!(
            wishes = wishes.len(),
            exclusions = exclusions.len(),
            extra_held = extra.len(),
            "Inputs loaded"
        );
        held.extend(extra);
        tracing::debug!(held = ?summarize_held(&held), "Held reservations");

        let mut navigator = self.navigator()?;
        let calendar = navigator.open_calendar(&credential).await?;
        let months = visit_order(&active_month_links(&calendar));
        tracing::info!(months = months.len(), "Calendar reached");

        let mut report = RunReport::default();
        let mut successes = Vec::new();

        for month in &months {
            let days = match navigator.month_days(month).await {
                Ok(days) => days,
                Err(e) => {
                    let error = Error::Navigation(e);
                    tracing::warn!(
                        month = %month,
                        category = error.category().label(),
                        error = %error,
                        "Skipping month"
                    );
                    report.record(error)?;
                    continue;
                }
            };

            for link in days {
                let link = navigator.day_link(&link);
                let Some(date) = date_of(&link) else {
                    tracing::debug!(link = %link, "Day link without date, skipping");
                    continue;
                };
                if is_excluded(&exclusions, &date) {
                    tracing::info!(date = %date, "Excluded date, skipping");
                    continue;
                }

                let day = navigator
                    .process_day(&link, &date, &wishes, &mut held, &mut successes, today)
                    .await;
                match day {
                    Ok(day) => {
                        for outcome in day.outcomes.iter().filter(|o| o.succeeded) {
                            tracing::info!(
                                facility = %outcome.facility,
                                date = %outcome.date,
                                time = %outcome.slot.clock_time,
                                "Booked"
                            );
                            deliver(self.notifier.as_ref(), &booking_message(outcome, today)).await;
                        }
                        report.absorb_day(day);
                    }
                    Err(e) => {
                        let error = Error::day(date, e);
                        tracing::warn!(
                            category = error.category().label(),
                            recoverable = error.is_recoverable(),
                            error = %error,
                            "Day aborted"
                        );
                        report.record(error)?;
                    }
                }
            }
        }

        report.successes = successes;
        for (reason, count) in &report.rejection_tally {
            tracing::info!(reason = reason.as_str(), count, "Rejected slots");
        }
        tracing::info!(
            booked = report.successes.len(),
            attempts = report.attempts,
            days = report.days_visited,
            errors = report.errors.len(),
            "Run finished"
        );
        Ok(report)
    }
}

/// Active months plus the month before the first, shuffled
fn visit_order(active: &[String]) -> Vec<String> {
    let mut months = active.to_vec();
    if let Some(previous) = active.first().and_then(|first| shift_month_back(first)) {
        months.insert(0, previous);
    }
    months.shuffle(&mut rand::thread_rng());
    months
}

fn is_excluded(exclusions: &[ExclusionDate], date: &str) -> bool {
    exclusions.iter().any(|e| e.matches(date))
}

/// Held entries in a stable, readable order for logs
fn summarize_held(held: &[ReservationEntry]) -> Vec<String> {
    let mut lines: Vec<String> = held
        .iter()
        .flat_map(|entry| {
            entry
                .slots
                .iter()
                .map(move |slot| format!("{} {} {}", entry.date, slot.clock_time, entry.facility_name))
        })
        .collect();
    lines.sort();
    lines
}
