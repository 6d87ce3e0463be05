//! Error types for the data-loader crate.
//!
//! Everything that can go wrong while turning a ratings table into a
//! `RatingStore` (or writing the completed table back out) lands here.

use thiserror::Error;

/// Errors that can occur during loading, validating and writing ratings
///
/// Ingestion is strict: a row that does not parse into
/// `(integer, integer, real)` aborts the load with one of the parse
/// variants below instead of being defaulted to zero.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// I/O error occurred while reading or writing a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV layer failed (bad quoting, invalid UTF-8, write failure)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Line in the ratings table couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: u64,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line}")]
    FieldCountMismatch {
        expected: usize,
        found: usize,
        line: u64,
    },

    /// Referenced entity doesn't exist (e.g. a user's rating points at a
    /// movie the movie index never saw)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: u32 },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
