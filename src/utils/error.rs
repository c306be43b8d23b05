//! Error types for the reservation engine
//!
//! This module defines the domain error types used throughout the application.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while exchanging requests with the reservation site
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server error with status code
    #[error("Server error: {0}")]
    ServerError(u16),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,

    /// Content decoding error
    #[error("Decoding error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether the failure is likely transient
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout => true,
            Self::ServerError(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
            Self::Decode(_) => false,
        }
    }
}

/// A screen that came back unusable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// The body carried one of the site's error fragments
    #[error("{screen}: error marker {marker:?} in response")]
    ErrorMarker { screen: String, marker: String },

    /// No body, or an empty one
    #[error("{screen}: empty response body")]
    EmptyBody { screen: String },

    /// An element required to continue the walk was absent
    #[error("{screen}: {element} not found")]
    MissingElement { screen: String, element: String },
}

impl ScreenError {
    pub fn marker(screen: impl Into<String>, marker: impl Into<String>) -> Self {
        Self::ErrorMarker {
            screen: screen.into(),
            marker: marker.into(),
        }
    }

    pub fn empty(screen: impl Into<String>) -> Self {
        Self::EmptyBody {
            screen: screen.into(),
        }
    }

    pub fn missing(screen: impl Into<String>, element: impl Into<String>) -> Self {
        Self::MissingElement {
            screen: screen.into(),
            element: element.into(),
        }
    }
}

/// Errors raised while loading user supplied inputs
#[derive(Error, Debug)]
pub enum InputError {
    /// Band code not present in the code table
    #[error("Unknown time band code: {0:?}")]
    UnknownBandCode(String),

    /// Wish list record with the wrong number of segments
    #[error("Malformed wish list entry {entry:?}: {reason}")]
    MalformedWishEntry { entry: String, reason: String },

    /// Quota segment that is not a number
    #[error("Invalid quota {0:?}: expected a non-negative integer")]
    InvalidQuota(String),

    /// Credential group missing or empty
    #[error("No credential found under {0:?}")]
    CredentialMissing(String),

    /// Credential file is not valid JSON
    #[error("Invalid credential file: {0}")]
    CredentialJson(#[from] serde_json::Error),

    /// Reading an input file failed
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while walking the reservation screens
#[derive(Error, Debug)]
pub enum NavigationError {
    /// Transport failure
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Unusable screen
    #[error("Screen error: {0}")]
    Screen(#[from] ScreenError),

    /// A link or parameter could not be turned into a URL
    #[error("Invalid link: {0}")]
    InvalidLink(String),
}

impl NavigationError {
    /// Whether the failure is likely transient
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Fetch(e) => e.is_recoverable(),
            Self::Screen(_) | Self::InvalidLink(_) => false,
        }
    }
}
