//! Push notifications for bookings and run reports
//!
//! ```text
//!   RunCoordinator ── booking succeeded ──┐
//!   commands::run ─── run report ─────────┤
//!                                         ▼
//!                                   dyn Notifier
//!                                  ┌─────┴─────┐
//!                                  ▼           ▼
//!                            LineNotifier  LogNotifier
//! ```
//!
//! Delivery is best effort: [`deliver`] logs a failed push and moves on, so
//! a notification problem never aborts a run.

pub mod line;
pub mod message;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::NotifyConfig;

pub use line::LineNotifier;
pub use message::{booking_message, error_report, payment_deadline, run_report};

/// Errors that can occur while pushing a message
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The push endpoint answered with an error status
    #[error("Push rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Invalid channel configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Destination for pushed text messages
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logs
    fn name(&self) -> &str;

    /// Push one text message
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Notifier that only writes messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        tracing::info!(text = text.trim_end(), "Notification");
        Ok(())
    }
}

/// Push `text`, logging instead of failing
pub async fn deliver(notifier: &dyn Notifier, text: &str) {
    match notifier.send(text).await {
        Ok(()) => tracing::debug!(channel = notifier.name(), "Notification delivered"),
        Err(e) => tracing::warn!(channel = notifier.name(), error = %e, "Notification failed"),
    }
}

/// LINE when a token and user id are configured, the log otherwise
pub fn from_config(config: &NotifyConfig) -> Arc<dyn Notifier> {
    match (&config.line_token, &config.line_user_id) {
        (Some(token), Some(user_id)) => {
            match LineNotifier::new(&config.line_endpoint, token.clone(), user_id.clone()) {
                Ok(notifier) => return Arc::new(notifier),
                Err(e) => tracing::warn!(error = %e, "LINE notifier unavailable, logging only"),
            }
        }
        _ => tracing::debug!("No LINE credentials configured, logging notifications only"),
    }
    Arc::new(LogNotifier)
}
