//! Core traits for the batch pipeline.
//!
//! The driver doesn't know where completed rows go. Anything implementing
//! `RatingSink` can receive them: the CSV table writer, or a plain `Vec`
//! in tests.

use anyhow::Result;
use data_loader::{MovieId, RatingTableWriter, UserId};
use serde::Serialize;
use std::io::Write;
use ubcf::{Prediction, PredictionSource};

/// How an output value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RatingOrigin {
    /// Present in the input, passed through unchanged
    Observed,
    /// Filled in by the predictor
    Predicted(PredictionSource),
}

/// One row of the completed ratings table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilledRating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub value: f64,
    pub origin: RatingOrigin,
}

impl FilledRating {
    pub fn observed(user_id: UserId, movie_id: MovieId, value: f64) -> Self {
        Self {
            user_id,
            movie_id,
            value,
            origin: RatingOrigin::Observed,
        }
    }

    pub fn predicted(user_id: UserId, movie_id: MovieId, prediction: Prediction) -> Self {
        Self {
            user_id,
            movie_id,
            value: prediction.value,
            origin: RatingOrigin::Predicted(prediction.source),
        }
    }
}

/// Destination for completed rows.
///
/// Rows arrive in the driver's order, ascending by user then movie.
pub trait RatingSink {
    /// Returns the name of this sink (for logging/debugging)
    fn name(&self) -> &str;

    /// Accept one completed row
    fn emit(&mut self, row: &FilledRating) -> Result<()>;

    /// Called once after the last row
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<W: Write> RatingSink for RatingTableWriter<W> {
    fn name(&self) -> &str {
        "RatingTableWriter"
    }

    fn emit(&mut self, row: &FilledRating) -> Result<()> {
        self.write_row(row.user_id, row.movie_id, row.value)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.flush()?;
        Ok(())
    }
}

impl RatingSink for Vec<FilledRating> {
    fn name(&self) -> &str {
        "Vec"
    }

    fn emit(&mut self, row: &FilledRating) -> Result<()> {
        self.push(*row);
        Ok(())
    }
}
