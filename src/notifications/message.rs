//! Text of the pushed messages

use chrono::NaiveDate;

use crate::config::NotifyConfig;
use crate::error::Error;
use crate::models::BookingOutcome;
use crate::utils::{format_date_ja, parse_ymd, truncate_text};

/// Bookings this many days ahead or fewer are paid at the counter
pub const PAY_ON_DAY_WINDOW_DAYS: i64 = 4;

/// Advance payment is due this many days before the booked date
pub const PAYMENT_LEAD_DAYS: u64 = 6;

pub const HEARTBEAT_MESSAGE: &str = "正常動作👌";

/// Payment deadline for a booking made on `today`
///
/// `None` means the booking can be paid on the day.
pub fn payment_deadline(today: NaiveDate, target: NaiveDate) -> Option<NaiveDate> {
    if (target - today).num_days() <= PAY_ON_DAY_WINDOW_DAYS {
        return None;
    }
    target.checked_sub_days(chrono::Days::new(PAYMENT_LEAD_DAYS))
}

/// Message pushed after a successful booking
///
/// ```text
/// 6月7日（土）09:00
/// 茅ヶ崎公園 1コート
/// ⌛️ 支払期限:
/// 6月1日（日）
/// ```
pub fn booking_message(outcome: &BookingOutcome, today: NaiveDate) -> String {
    let Some(target) = parse_ymd(&outcome.date) else {
        return format!(
            "{} {}\n{}\n",
            outcome.date, outcome.slot.clock_time, outcome.facility
        );
    };

    let mut msg = format!(
        "{}{}\n{}\n",
        format_date_ja(target),
        outcome.slot.clock_time,
        outcome.facility
    );
    match payment_deadline(today, target) {
        None => msg.push_str("・当日支払いOK"),
        Some(deadline) => {
            msg.push_str("⌛️ 支払期限: \n");
            msg.push_str(&format_date_ja(deadline));
        }
    }
    msg
}

/// Summary of the errors a run collected
///
/// At most `max_listed` errors are listed, each cut to `width` characters.
pub fn error_report(errors: &[Error], max_listed: usize, width: usize) -> String {
    let mut msg = format!("⚠️ 自動予約で例外が発生しました\n件数: {}\n", errors.len());

    for (i, err) in errors.iter().take(max_listed).enumerate() {
        let line = format!("{}: {}", err.kind(), err);
        msg.push_str(&format!("#{} {}\n", i + 1, truncate_text(&line, width)));
    }
    if errors.len() > max_listed {
        msg.push_str(&format!("他 {} 件\n", errors.len() - max_listed));
    }
    msg
}

/// Whether an error summary is pushed at `hour`
pub fn should_report(hour: u32, config: &NotifyConfig) -> bool {
    config.report_hours.contains(&hour)
}

/// Whether the heartbeat is pushed at `hour`
pub fn is_heartbeat_hour(hour: u32, config: &NotifyConfig) -> bool {
    config.heartbeat_hour == Some(hour)
}

/// Message pushed after a run that did not fail outright
///
/// Errors are summarized at report hours only; an error-free run pushes the
/// heartbeat at the heartbeat hour.
pub fn run_report(errors: &[Error], hour: u32, config: &NotifyConfig) -> Option<String> {
    if errors.is_empty() {
        is_heartbeat_hour(hour, config).then(|| HEARTBEAT_MESSAGE.to_string())
    } else if should_report(hour, config) {
        Some(error_report(
            errors,
            config.max_reported_errors,
            config.error_message_width,
        ))
    } else {
        None
    }
}
