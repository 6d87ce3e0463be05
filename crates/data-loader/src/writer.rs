//! Writer for the completed ratings table.
//!
//! Output header is `UserID,ItemID,rating`. Values are written with
//! Rust's shortest round-trip `Display` for `f64`, which never switches to
//! exponent notation: `4`, `3.5`, `3.6666666666666665`.

use crate::error::{DataLoadError, Result};
use crate::types::{MovieId, UserId};
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Header row of the completed table
pub const OUTPUT_HEADER: [&str; 3] = ["UserID", "ItemID", "rating"];

/// Streams `(user, movie, value)` rows into a CSV table
pub struct RatingTableWriter<W: Write> {
    inner: Writer<W>,
    rows: usize,
}

impl RatingTableWriter<File> {
    /// Create (or truncate) the output file and write the header
    pub fn create(path: &Path) -> Result<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> RatingTableWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = WriterBuilder::new().has_headers(false).from_writer(writer);
        inner.write_record(OUTPUT_HEADER)?;
        Ok(Self { inner, rows: 0 })
    }

    pub fn write_row(&mut self, user_id: UserId, movie_id: MovieId, value: f64) -> Result<()> {
        self.inner.write_record([
            user_id.to_string(),
            movie_id.to_string(),
            format_rating(value),
        ])?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far (header excluded)
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| DataLoadError::IoError(e.into_error()))
    }
}

/// Format a rating as a plain decimal number
pub fn format_rating(value: f64) -> String {
    // -0.0 would otherwise print with a sign
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}
