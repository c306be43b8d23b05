//! Session-driven navigation of the reservation site
//!
//! This module walks the site's fixed screen sequence, extracts availability,
//! and submits booking forms for matched slots.
//!
//! - [`Transport`] - request/response seam, implemented by [`fetcher::HttpTransport`]
//! - [`navigator`] - the per-session state machine
//! - [`coordinator`] - the run loop over months and days

pub mod coordinator;
pub mod fetcher;
pub mod headers;
pub mod navigator;
pub mod url;

pub use coordinator::{RunCoordinator, RunReport};
pub use fetcher::HttpTransport;
pub use navigator::{NavState, SessionContext, SessionNavigator};

use async_trait::async_trait;

use crate::utils::error::FetchError;

/// One request/response exchange with the site
///
/// Implementations keep cookies across calls and decode the body charset.
/// `Ok(None)` means the server answered without a body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`
    async fn get(&self, url: &str) -> Result<Option<String>, FetchError>;

    /// Submit `form` to `url` as `application/x-www-form-urlencoded`
    async fn post(&self, url: &str, form: &[(String, String)]) -> Result<Option<String>, FetchError>;
}
