//! Unified error handling for the yoyaku crate
//!
//! This module provides a unified error type that consolidates the domain
//! errors into a single `Error` enum, while keeping the domain-specific errors
//! available where a caller needs the detail.
//!
//! # Architecture
//!
//! - [`YoyakuErrorTrait`] - Common interface implemented by the unified error
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! # Usage
//!
//! ```rust,ignore
//! use yoyaku::error::{Error, YoyakuErrorTrait};
//!
//! fn handle_error(err: Error) {
//!     if err.is_fatal_to_run() {
//!         eprintln!("Run aborted: {err}");
//!     } else {
//!         eprintln!("Skipped: {err}");
//!     }
//! }
//! ```

use thiserror::Error;

pub use crate::utils::error::{FetchError, InputError, NavigationError, ScreenError};

/// Common trait for yoyaku error types
pub trait YoyakuErrorTrait: std::error::Error {
    /// Check if this error is transient
    fn is_recoverable(&self) -> bool;

    /// Get the error category for handling strategies
    fn category(&self) -> ErrorCategory;
}

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Error screens and missing navigation elements
    Screen,
    /// Malformed user inputs (wish list, credentials)
    Input,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    /// Short Japanese label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            Self::Network => "通信エラー",
            Self::Screen => "画面エラー",
            Self::Input => "入力エラー",
            Self::Config => "設定エラー",
        }
    }
}

/// Unified error type for the yoyaku crate
#[derive(Error, Debug)]
pub enum Error {
    /// Failure while setting up the session (init, login, calendar)
    #[error("Session setup failed at {phase}: {source}")]
    Session {
        phase: &'static str,
        #[source]
        source: NavigationError,
    },

    /// Failure confined to one day's walk
    #[error("Day {date} aborted: {source}")]
    Day {
        date: String,
        #[source]
        source: NavigationError,
    },

    /// Navigation errors outside a day or setup phase
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Input loading errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl YoyakuErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Session { source, .. } | Self::Day { source, .. } => source.is_recoverable(),
            Self::Navigation(e) => e.is_recoverable(),
            Self::Input(_) => false,
            Self::Config(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        let nav_category = |e: &NavigationError| match e {
            NavigationError::Fetch(_) => ErrorCategory::Network,
            NavigationError::Screen(_) | NavigationError::InvalidLink(_) => ErrorCategory::Screen,
        };
        match self {
            Self::Session { source, .. } | Self::Day { source, .. } => nav_category(source),
            Self::Navigation(e) => nav_category(e),
            Self::Input(_) => ErrorCategory::Input,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a setup-phase failure
    pub fn session(phase: &'static str, source: impl Into<NavigationError>) -> Self {
        Self::Session {
            phase,
            source: source.into(),
        }
    }

    /// Wrap a failure confined to one day
    pub fn day(date: impl Into<String>, source: impl Into<NavigationError>) -> Self {
        Self::Day {
            date: date.into(),
            source: source.into(),
        }
    }

    /// Whether this error ends the whole run
    ///
    /// Setup and login failures are fatal; a failed day is not.
    pub fn is_fatal_to_run(&self) -> bool {
        matches!(self, Self::Session { .. } | Self::Input(_) | Self::Config(_))
    }

    /// Short variant name used in error reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Session { .. } => "SessionError",
            Self::Day { .. } => "DayError",
            Self::Navigation(_) => "NavigationError",
            Self::Input(_) => "InputError",
            Self::Config(_) => "ConfigError",
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
