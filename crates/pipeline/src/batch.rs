//! The BatchDriver completes the whole ratings table.
//!
//! Every cell of every user is visited exactly once, ascending by user id
//! then movie id. Observed values pass through; missing ones go to the
//! predictor. Rows stream into a `RatingSink`.

use crate::traits::{FilledRating, RatingOrigin, RatingSink};
use anyhow::{ensure, Context, Result};
use data_loader::{DataLoadError, MovieId, RatingValue, User};
use rayon::prelude::*;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};
use ubcf::Predictor;

/// Counters for one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Rows emitted (== rating cells in the store)
    pub rows: usize,
    pub observed: usize,
    pub predicted: usize,
    /// Predictions backed by at least one neighbor
    pub neighbor_predictions: usize,
    /// Predictions that fell back to a mean
    pub fallback_predictions: usize,
    pub elapsed: Duration,
}

impl BatchSummary {
    fn record(&mut self, row: &FilledRating) {
        self.rows += 1;
        match row.origin {
            RatingOrigin::Observed => self.observed += 1,
            RatingOrigin::Predicted(source) => {
                self.predicted += 1;
                if source.is_fallback() {
                    self.fallback_predictions += 1;
                } else {
                    self.neighbor_predictions += 1;
                }
            }
        }
    }
}

/// Drives the predict phase over a frozen store.
///
/// ## Usage
/// ```ignore
/// let store = RatingStore::load_from_file(path)?.freeze();
/// let driver = BatchDriver::new(Predictor::new(store));
///
/// let mut writer = RatingTableWriter::create(output)?;
/// let summary = driver.run(&mut writer)?;
/// ```
#[derive(Debug, Clone)]
pub struct BatchDriver {
    predictor: Predictor,
    parallel: bool,
}

impl BatchDriver {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            predictor,
            parallel: false,
        }
    }

    /// Predict users in parallel with rayon (default: off)
    ///
    /// Output order is the same as the sequential run.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Complete every rating cell and stream the rows into `sink`
    #[instrument(skip_all, fields(mode = ?self.predictor.mode(), parallel = self.parallel, sink = sink.name()))]
    pub fn run<S: RatingSink + ?Sized>(&self, sink: &mut S) -> Result<BatchSummary> {
        let start = Instant::now();
        let store = self.predictor.store();
        let mut summary = BatchSummary::default();

        if self.parallel {
            let users: Vec<&User> = store.users().collect();
            let filled = users
                .par_iter()
                .map(|user| self.fill_user(user))
                .collect::<Result<Vec<_>>>()?;
            for row in filled.iter().flatten() {
                summary.record(row);
                sink.emit(row)?;
            }
        } else {
            for user in store.users() {
                for (&movie_id, &value) in &user.ratings {
                    let row = self.fill_cell(user, movie_id, value)?;
                    summary.record(&row);
                    sink.emit(&row)?;
                }
            }
        }

        sink.finish()
            .with_context(|| format!("Failed to finish sink {}", sink.name()))?;

        summary.elapsed = start.elapsed();
        info!(
            rows = summary.rows,
            observed = summary.observed,
            predicted = summary.predicted,
            fallbacks = summary.fallback_predictions,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Batch complete"
        );
        Ok(summary)
    }

    /// All completed rows for one user, ascending by movie id
    fn fill_user(&self, user: &User) -> Result<Vec<FilledRating>> {
        let rows = user
            .ratings
            .iter()
            .map(|(&movie_id, &value)| self.fill_cell(user, movie_id, value))
            .collect::<Result<Vec<_>>>()?;
        debug!(user_id = user.id, rows = rows.len(), "Filled user");
        Ok(rows)
    }

    fn fill_cell(&self, user: &User, movie_id: MovieId, value: RatingValue) -> Result<FilledRating> {
        match value {
            RatingValue::Known(observed) => Ok(FilledRating::observed(user.id, movie_id, observed)),
            RatingValue::Missing => {
                let movie = self
                    .predictor
                    .store()
                    .get_movie(movie_id)
                    .ok_or_else(|| DataLoadError::MissingReference {
                        entity: "Movie".to_string(),
                        id: movie_id,
                    })
                    .with_context(|| {
                        format!("Cannot predict rating of user {} for movie {}", user.id, movie_id)
                    })?;

                let prediction = self.predictor.predict(user, movie);
                ensure!(
                    prediction.value.is_finite(),
                    "Non-finite prediction for user {} and movie {}",
                    user.id,
                    movie_id
                );
                Ok(FilledRating::predicted(user.id, movie_id, prediction))
            }
        }
    }
}
