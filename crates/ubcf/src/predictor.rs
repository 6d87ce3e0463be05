//! Top-k neighbor prediction
//!
//! ## Algorithm
//! 1. Score every other rater of the movie by similarity to the target
//! 2. Sort by similarity, then by rating, both descending
//! 3. Keep the first k
//! 4. Aggregate their ratings, or fall back to a mean when none is usable
//!
//! How steps 1 and 4 behave depends on [`PredictionMode`].

use crate::similarity::{pearson, SentinelView, SingleRating};
use crate::types::{
    Prediction, PredictionMode, PredictionSource, SimilarityScore, DEFAULT_K,
};
use data_loader::{DataLoadError, Movie, MovieId, StoreSnapshot, User, UserId};
use tracing::{debug, instrument, warn};

/// Predicts missing ratings from the frozen rating store
#[derive(Debug, Clone)]
pub struct Predictor {
    /// Shared reference to the store (read-only, so no Mutex needed)
    store: StoreSnapshot,

    /// Neighbors kept after ranking
    k: usize,

    mode: PredictionMode,
}

impl Predictor {
    /// Create a predictor with `k = DEFAULT_K` in `Compatible` mode
    pub fn new(store: StoreSnapshot) -> Self {
        Self {
            store,
            k: DEFAULT_K,
            mode: PredictionMode::default(),
        }
    }

    /// Configure the neighbor model (default: `Compatible`)
    pub fn with_mode(mut self, mode: PredictionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Configure how many neighbors are kept (default: 3, minimum: 1)
    pub fn with_neighbor_count(mut self, k: usize) -> Self {
        self.k = k.max(1);
        self
    }

    pub fn mode(&self) -> PredictionMode {
        self.mode
    }

    pub fn neighbor_count(&self) -> usize {
        self.k
    }

    pub fn store(&self) -> &StoreSnapshot {
        &self.store
    }

    /// Look up both sides in the store and predict
    ///
    /// An id the store doesn't know is a `MissingReference`, never an
    /// empty stand-in.
    pub fn predict_for(&self, user_id: UserId, movie_id: MovieId) -> data_loader::Result<Prediction> {
        let user = self
            .store
            .get_user(user_id)
            .ok_or_else(|| DataLoadError::MissingReference {
                entity: "User".to_string(),
                id: user_id,
            })?;
        let movie = self
            .store
            .get_movie(movie_id)
            .ok_or_else(|| DataLoadError::MissingReference {
                entity: "Movie".to_string(),
                id: movie_id,
            })?;
        Ok(self.predict(user, movie))
    }

    /// Predict `target`'s rating of `movie`
    #[instrument(level = "debug", skip(self, target, movie), fields(user_id = target.id, movie_id = movie.id))]
    pub fn predict(&self, target: &User, movie: &Movie) -> Prediction {
        let neighbors = self.rank_neighbors(target, movie);
        let top = &neighbors[..neighbors.len().min(self.k)];

        let prediction = match self.mode {
            PredictionMode::Compatible => aggregate_compatible(top, movie),
            PredictionMode::Weighted => self.aggregate_weighted(top, movie),
        };

        debug!(
            candidates = neighbors.len(),
            value = prediction.value,
            source = ?prediction.source,
            "Predicted rating"
        );
        prediction
    }

    /// Score and sort every other rater of `movie`
    pub fn rank_neighbors(&self, target: &User, movie: &Movie) -> Vec<SimilarityScore> {
        let mut scores = match self.mode {
            PredictionMode::Compatible => score_single_rating(target, movie),
            PredictionMode::Weighted => self.score_full_profile(target, movie),
        };
        scores.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| b.rating.total_cmp(&a.rating))
        });
        scores
    }

    /// Every other rater with an observed rating, compared on their whole
    /// rating vector
    fn score_full_profile(&self, target: &User, movie: &Movie) -> Vec<SimilarityScore> {
        movie
            .ratings
            .iter()
            .filter(|&(&user_id, _)| user_id != target.id)
            .filter_map(|(&user_id, value)| {
                let rating = value.known()?;
                let Some(neighbor) = self.store.get_user(user_id) else {
                    warn!(user_id, movie_id = movie.id, "Rater missing from user index");
                    return None;
                };
                Some(SimilarityScore {
                    user_id,
                    similarity: pearson(target, neighbor),
                    rating,
                })
            })
            .collect()
    }

    fn aggregate_weighted(&self, top: &[SimilarityScore], movie: &Movie) -> Prediction {
        let (weighted_sum, weight, used) = top
            .iter()
            .filter(|s| s.similarity > 0.0)
            .fold((0.0, 0.0, 0usize), |(sum, weight, used), s| {
                (sum + s.similarity * s.rating, weight + s.similarity, used + 1)
            });

        if weight > 0.0 {
            return Prediction {
                value: weighted_sum / weight,
                source: PredictionSource::Neighbors,
                neighbors: used,
            };
        }

        match (movie.known_mean(), self.store.global_mean()) {
            (Some(mean), _) => Prediction::fallback(mean, PredictionSource::MovieMean),
            (None, Some(mean)) => Prediction::fallback(mean, PredictionSource::GlobalMean),
            (None, None) => Prediction::fallback(0.0, PredictionSource::GlobalMean),
        }
    }
}

/// Every other rater, reduced to a one-rating vector holding only their
/// value for this movie (missing reads as 0)
fn score_single_rating(target: &User, movie: &Movie) -> Vec<SimilarityScore> {
    let target_view = SentinelView(target);
    movie
        .ratings
        .iter()
        .filter(|&(&user_id, _)| user_id != target.id)
        .map(|(&user_id, value)| {
            let rating = value.sentinel_value();
            SimilarityScore {
                user_id,
                similarity: pearson(&target_view, &SingleRating::new(movie.id, rating)),
                rating,
            }
        })
        .collect()
}

/// Σ(similarity · rating) over the top k, divided by how many were taken
fn aggregate_compatible(top: &[SimilarityScore], movie: &Movie) -> Prediction {
    if top.is_empty() {
        return Prediction::fallback(movie.sentinel_mean(), PredictionSource::MovieMean);
    }

    let weighted_sum: f64 = top.iter().map(|s| s.similarity * s.rating).sum();
    Prediction {
        value: weighted_sum / top.len() as f64,
        source: PredictionSource::Neighbors,
        neighbors: top.len(),
    }
}
