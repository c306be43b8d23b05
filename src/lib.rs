//! yoyaku - Reservation matching engine for a municipal tennis court site
//!
//! The site has no API: it is a chain of server-rendered screens bound to a
//! session id. This crate walks those screens, turns the availability tables
//! into structured slots, matches them against a wish list and submits the
//! booking forms of the slots it selects.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`crawler`] - Transport, session navigation and the run loop
//! - [`parser`] - Availability tables and navigation screens
//! - [`matcher`] - Demand matching and reservation comparison
//! - [`models`] - Core data structures and types
//! - [`sources`] - Wish list, exclusions, held CSV and credential inputs
//! - [`notifications`] - Booking and run report messages
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use yoyaku::config::Config;
//! use yoyaku::crawler::{HttpTransport, RunCoordinator};
//! use yoyaku::notifications;
//! use yoyaku::sources::FileInputs;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let coordinator = RunCoordinator::new(
//!         Box::new(HttpTransport::new(&config.transport)?),
//!         config.site.clone(),
//!         config.target_weekdays()?,
//!         notifications::from_config(&config.notify),
//!     );
//!     let inputs = FileInputs::new(config.inputs.clone());
//!     let report = coordinator.run(&inputs, chrono::Local::now().date_naive()).await?;
//!     println!("booked {}", report.successes.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crawler;
pub mod error;
pub mod matcher;
pub mod models;
pub mod notifications;
pub mod parser;
pub mod sources;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::crawler::{RunCoordinator, RunReport, SessionNavigator, Transport};
    pub use crate::error::{Error, ErrorCategory, Result, YoyakuErrorTrait};
    pub use crate::matcher::{match_day, Candidate, MatchOutcome};
    pub use crate::models::{
        FacilityArea, ReservationEntry, TimeBand, TimeSlot, WishListEntry,
    };
    pub use crate::sources::{FileInputs, InputSource};
}

// Direct re-exports for convenience
pub use models::{FacilityArea, ReservationEntry, TimeBand, TimeSlot, WishListEntry};
