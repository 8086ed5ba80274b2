#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Feature derivation for train-delay observations.
//!
//! Turns a raw observation (a date string plus five weather readings)
//! into the fixed ten-column feature vector the regression models are
//! trained on. The batch pipeline and the live server parse dates in
//! different formats, so the format is always an explicit argument;
//! the derived columns are identical on both paths.

mod observation;
mod vector;

pub use observation::{Observation, RawObservation};
pub use vector::{FeatureVector, FEATURE_NAMES};

use chrono::NaiveDate;
use thiserror::Error;

/// Date layout accepted by [`parse_date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `day-month-year`, as found in the historical training CSV.
    Batch,
    /// `year-month-day`, as submitted by live prediction requests.
    Live,
}

impl DateFormat {
    /// chrono strftime pattern for the format.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Batch => "%d-%m-%Y",
            Self::Live => "%Y-%m-%d",
        }
    }

    /// Human-readable layout, used in error messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Batch => "DD-MM-YYYY",
            Self::Live => "YYYY-MM-DD",
        }
    }
}

/// Parses a date string in the given format.
///
/// Both call sites (CSV ingestion and the live request path) go through
/// this one routine so the two layouts stay named and explicit.
pub fn parse_date(value: &str, format: DateFormat) -> Result<NaiveDate, InputError> {
    NaiveDate::parse_from_str(value.trim(), format.pattern()).map_err(|_| InputError::DateParse {
        value: value.to_owned(),
        expected: format.describe(),
    })
}

/// Faults in client- or file-supplied observation fields.
///
/// These are reported at the boundary, before anything reaches the
/// model layer, so callers can distinguish bad input from a failed
/// prediction.
#[derive(Debug, Error)]
pub enum InputError {
    /// The date string did not match the expected layout.
    #[error("invalid date {value:?}: expected {expected}")]
    DateParse {
        /// Rejected input.
        value: String,
        /// Layout the caller selected.
        expected: &'static str,
    },
    /// A reading could not be coerced to a number.
    #[error("invalid {field} reading {value:?}: expected a number")]
    InvalidReading {
        /// Field name.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
    /// An indicator could not be coerced to 0/1.
    #[error("invalid {field} flag {value:?}: expected 0 or 1")]
    InvalidFlag {
        /// Field name.
        field: &'static str,
        /// Rejected input.
        value: String,
    },
}
