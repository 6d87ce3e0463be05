//! Parser for the ratings table.
//!
//! Format: a comma-separated file with a header row and three columns,
//! `userId,movieId,rating`. A rating of `0` marks a cell to be predicted.
//! Header names are not checked, only the column count. An empty input
//! is an empty table.
//!
//! Every row must parse completely. A short row, a non-numeric id or a
//! non-finite rating aborts the load with the offending line number.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of columns in the ratings table
pub const RATING_COLUMNS: usize = 3;

/// Parse a ratings file from disk
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = File::open(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    parse_ratings_from_reader(file, &name)
}

/// Parse a ratings table from any reader
///
/// `source` names the input in error messages.
pub fn parse_ratings_from_reader<R: Read>(reader: R, source: &str) -> Result<Vec<Rating>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = reader.headers()?;
    if header.is_empty() {
        return Ok(Vec::new());
    }
    if header.len() != RATING_COLUMNS {
        return Err(DataLoadError::FieldCountMismatch {
            expected: RATING_COLUMNS,
            found: header.len(),
            line: 1,
        });
    }

    let mut ratings = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        ratings.push(parse_record(&record, source, line)?);
    }
    Ok(ratings)
}

fn parse_record(record: &StringRecord, source: &str, line: u64) -> Result<Rating> {
    if record.len() != RATING_COLUMNS {
        return Err(DataLoadError::FieldCountMismatch {
            expected: RATING_COLUMNS,
            found: record.len(),
            line,
        });
    }

    let parse_error = |reason: String| DataLoadError::ParseError {
        file: source.to_string(),
        line,
        reason,
    };

    let user_id: UserId = record[0]
        .parse()
        .map_err(|e| parse_error(format!("Invalid userId {:?}: {}", &record[0], e)))?;
    let movie_id: MovieId = record[1]
        .parse()
        .map_err(|e| parse_error(format!("Invalid movieId {:?}: {}", &record[1], e)))?;
    let raw: f64 = record[2]
        .parse()
        .map_err(|e| parse_error(format!("Invalid rating {:?}: {}", &record[2], e)))?;

    if !raw.is_finite() {
        return Err(DataLoadError::InvalidValue {
            field: "rating".to_string(),
            value: record[2].to_string(),
        });
    }

    Ok(Rating::new(user_id, movie_id, RatingValue::from_raw(raw)))
}
