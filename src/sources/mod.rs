//! User supplied inputs: credential, wish list, exclusions and held CSV
//!
//! The run coordinator reads inputs through [`InputSource`] so tests can
//! supply them in memory. [`FileInputs`] reads the files named in
//! [`InputsConfig`].

pub mod formats;

pub use formats::{parse_credentials, parse_exclusions, parse_held_csv, parse_wish_list};

use std::path::Path;

use crate::config::InputsConfig;
use crate::models::{Credential, ExclusionDate, ReservationEntry, WishListEntry};
use crate::utils::error::InputError;

/// Provider of the run's inputs
pub trait InputSource: Send + Sync {
    /// The account to log in with
    fn credential(&self) -> Result<Credential, InputError>;

    /// Booking targets, in file order
    fn wish_list(&self) -> Result<Vec<WishListEntry>, InputError>;

    /// Dates on which nothing is matched
    fn exclusions(&self, current_year: i32) -> Result<Vec<ExclusionDate>, InputError>;

    /// Reservations held outside the account's held list
    fn extra_held(&self) -> Result<Vec<ReservationEntry>, InputError>;
}

/// Inputs read from disk
///
/// The credential and wish list files are required. A missing exclusion
/// list or held CSV counts as empty.
#[derive(Debug, Clone)]
pub struct FileInputs {
    config: InputsConfig,
}

impl FileInputs {
    pub fn new(config: InputsConfig) -> Self {
        Self { config }
    }
}

fn read_required(path: &Path) -> Result<String, InputError> {
    std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional(path: &Path) -> Result<String, InputError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Optional input file not found");
            Ok(String::new())
        }
        Err(source) => Err(InputError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl InputSource for FileInputs {
    fn credential(&self) -> Result<Credential, InputError> {
        let json = read_required(&self.config.credential_path)?;
        parse_credentials(&json, &self.config.credential_group)
    }

    fn wish_list(&self) -> Result<Vec<WishListEntry>, InputError> {
        let text = read_required(&self.config.wish_list_path)?;
        let wishes = parse_wish_list(&text)?;
        tracing::info!(count = wishes.len(), "Loaded wish list");
        Ok(wishes)
    }

    fn exclusions(&self, current_year: i32) -> Result<Vec<ExclusionDate>, InputError> {
        let text = read_optional(&self.config.exclusion_path)?;
        Ok(parse_exclusions(&text, current_year))
    }

    fn extra_held(&self) -> Result<Vec<ReservationEntry>, InputError> {
        let text = read_optional(&self.config.held_csv_path)?;
        Ok(parse_held_csv(&text))
    }
}
