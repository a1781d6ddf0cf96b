//! # Error Types
//!
//! This module defines the error type for the timetabling engine. Only
//! construction-time problems surface as errors: a malformed event catalog,
//! unparsable catalog text, or an invalid set of evolution options. Conditions
//! that arise during the search itself (overlapping events, an exhausted
//! placement search) are absorbed by the fitness function and never fail an
//! operation.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use timetabler::error::{TimetableError, Result};
//!
//! fn check_rooms(rooms: usize) -> Result<()> {
//!     if rooms == 0 {
//!         return Err(TimetableError::MalformedInput("no rooms".to_string()));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_rooms(0).is_err());
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use timetabler::error::{TimetableError, OptionExt};
//!
//! fn best_score(scores: &[i64]) -> timetabler::error::Result<i64> {
//!     scores.iter().max().cloned().ok_or_else_timetable(||
//!         TimetableError::EmptyPopulation
//!     )
//! }
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while setting up or running a timetable search.
#[derive(Error, Debug)]
pub enum TimetableError {
    /// The event catalog cannot describe a valid week: an event without
    /// duration, no rooms, no days, or an event longer than a whole day.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Catalog text could not be parsed.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// Error that occurs when a fitness calculation yields NaN or infinity.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for timetable operations.
pub type Result<T> = std::result::Result<T, TimetableError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use timetabler::error::ResultExt;
/// use std::fs::File;
///
/// fn open_catalog(path: &str) -> timetabler::error::Result<()> {
///     File::open(path).context("Failed to open catalog")?;
///     Ok(())
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error into a `TimetableError` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| TimetableError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, TimetableError>` using
    /// a closure to generate the error.
    fn ok_or_else_timetable<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> TimetableError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_timetable<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> TimetableError,
    {
        self.ok_or_else(err_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_context_wraps_message() {
        let failing: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let err = failing.context("Failed to read catalog").unwrap_err();

        match err {
            TimetableError::Other(msg) => {
                assert!(msg.starts_with("Failed to read catalog"));
                assert!(msg.contains("missing"));
            }
            _ => panic!("Expected Other error"),
        }
    }

    #[test]
    fn test_option_ext() {
        let value: Option<u8> = None;
        let result = value.ok_or_else_timetable(|| TimetableError::EmptyPopulation);
        assert!(matches!(result, Err(TimetableError::EmptyPopulation)));
        assert_eq!(Some(3).ok_or_else_timetable(|| TimetableError::EmptyPopulation).unwrap(), 3);
    }

    #[test]
    fn test_parse_error_display() {
        let err = TimetableError::Parse {
            line: 4,
            message: "missing duration".to_string(),
        };
        assert_eq!(err.to_string(), "Parse error on line 4: missing duration");
    }
}
