//! Types shared by the similarity engine and the predictor.

use data_loader::UserId;
use serde::{Deserialize, Serialize};

/// Number of neighbors a prediction is built from
pub const DEFAULT_K: usize = 3;

/// Which neighbor model the predictor runs.
///
/// The two variants differ as a unit, not piecemeal:
///
/// - `Compatible` compares the target against a one-rating stand-in for
///   each neighbor. Pearson over a single co-rated movie is always 0, so
///   the top-k sum is 0 and every neighbor-backed prediction is 0. A movie
///   with no other rater falls back to the mean of all its cells, with
///   missing cells read as 0.
/// - `Weighted` compares full rating vectors, averages the top-k ratings
///   weighted by positive similarity, and falls back to the movie's
///   observed mean, then the global mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    #[default]
    Compatible,
    Weighted,
}

/// Where a predicted value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionSource {
    /// Aggregated from the top-k neighbors
    Neighbors,
    /// No usable neighbor; mean of the movie's ratings
    MovieMean,
    /// Movie has no observed rating either; mean over the whole store
    GlobalMean,
}

impl PredictionSource {
    pub fn is_fallback(self) -> bool {
        !matches!(self, PredictionSource::Neighbors)
    }
}

/// A single predicted rating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub value: f64,
    pub source: PredictionSource,
    /// Neighbors that contributed to `value`
    pub neighbors: usize,
}

impl Prediction {
    pub fn fallback(value: f64, source: PredictionSource) -> Self {
        Self {
            value,
            source,
            neighbors: 0,
        }
    }
}

/// One candidate neighbor, scored against the target user.
///
/// Built per prediction and dropped right after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityScore {
    pub user_id: UserId,
    pub similarity: f64,
    /// The neighbor's rating of the movie being predicted
    pub rating: f64,
}
