use anyhow::{Context, Result};
use chrono::{Local, Timelike};

use yoyaku::config::Config;
use yoyaku::crawler::{HttpTransport, RunCoordinator};
use yoyaku::notifications::message::should_report;
use yoyaku::notifications::{self, deliver, error_report, run_report};
use yoyaku::sources::FileInputs;

pub async fn run(config: Config, dry_run: bool) -> Result<()> {
    let weekdays = config.target_weekdays()?;
    let transport =
        HttpTransport::new(&config.transport).context("Failed to create HTTP transport")?;
    let notifier = notifications::from_config(&config.notify);
    let inputs = FileInputs::new(config.inputs.clone());

    let coordinator = RunCoordinator::new(
        Box::new(transport),
        config.site.clone(),
        weekdays,
        notifier.clone(),
    )
    .with_dry_run(dry_run);

    let now = Local::now();
    if dry_run {
        println!("Dry run: booking forms will not be submitted");
    }

    let report = match coordinator.run(&inputs, now.date_naive()).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, kind = e.kind(), "Run aborted");
            // Fatal errors are pushed at any hour, others follow the report hours
            if e.is_fatal_to_run() || should_report(now.hour(), &config.notify) {
                let text = error_report(
                    std::slice::from_ref(&e),
                    config.notify.max_reported_errors,
                    config.notify.error_message_width,
                );
                deliver(notifier.as_ref(), &text).await;
            }
            return Err(e.into());
        }
    };

    println!("Reservation run finished");
    println!("================================");
    println!("  Days visited: {}", report.days_visited);
    println!("  Booking attempts: {}", report.attempts);
    println!("  Booked: {}", report.successes.len());
    for outcome in &report.successes {
        println!(
            "    {} {} {}",
            outcome.date, outcome.slot.clock_time, outcome.facility
        );
    }
    if !report.rejection_tally.is_empty() {
        println!("  Rejected slots:");
        for (reason, count) in &report.rejection_tally {
            println!("    {reason}: {count}");
        }
    }
    println!("  Errors: {}", report.errors.len());
    for err in &report.errors {
        println!("    {err}");
    }

    if let Some(text) = run_report(&report.errors, now.hour(), &config.notify) {
        deliver(notifier.as_ref(), &text).await;
    }

    Ok(())
}
