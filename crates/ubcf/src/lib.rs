//! # UBCF Crate
//!
//! User-based collaborative filtering over a frozen `RatingStore`.
//!
//! ## Components
//!
//! ### Similarity Engine
//! Pearson correlation between two rating vectors, restricted to the
//! movies both have rated. No overlap or zero variance gives 0.
//!
//! ### Predictor
//! For a (user, movie) cell without a rating:
//! - Scores every other rater of the movie against the user
//! - Keeps the k most similar (k = 3)
//! - Aggregates their ratings, or falls back to a mean
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingStore;
//! use ubcf::{PredictionMode, Predictor};
//!
//! let store = RatingStore::load_from_file(path)?.freeze();
//! let predictor = Predictor::new(store.clone()).with_mode(PredictionMode::Weighted);
//!
//! let prediction = predictor.predict_for(user_id, movie_id)?;
//! println!("{} ({:?})", prediction.value, prediction.source);
//! ```

// Public modules
pub mod types;
pub mod similarity;
pub mod predictor;

// Re-export commonly used types
pub use types::{Prediction, PredictionMode, PredictionSource, SimilarityScore, DEFAULT_K};
pub use similarity::{pearson, RatingVector, SentinelView, SingleRating};
pub use predictor::Predictor;
