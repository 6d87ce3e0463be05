//! Core domain types for the ratings table.
//!
//! The store keeps every known `(user, movie, value)` fact twice: once
//! under the user and once under the movie, so "who rated this movie"
//! never needs a scan over all users.
//!
//! Both indexes are `BTreeMap`s. Iteration is ascending by id, which is
//! what makes the completed table come out in a reproducible order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

/// The value the input table uses to mark a rating as "to be predicted"
pub const MISSING_SENTINEL: f64 = 0.0;

// =============================================================================
// Rating Types
// =============================================================================

/// A rating cell: either an observed value or a hole to fill.
///
/// The on-disk format overloads `0` to mean "missing". That overload is
/// resolved once, in [`RatingValue::from_raw`], and nothing past the parser
/// looks at the raw number again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RatingValue {
    Known(f64),
    Missing,
}

impl RatingValue {
    /// Interpret a raw table value, mapping the sentinel to `Missing`
    pub fn from_raw(value: f64) -> Self {
        if value == MISSING_SENTINEL {
            RatingValue::Missing
        } else {
            RatingValue::Known(value)
        }
    }

    /// The observed value, if any
    pub fn known(self) -> Option<f64> {
        match self {
            RatingValue::Known(value) => Some(value),
            RatingValue::Missing => None,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, RatingValue::Missing)
    }

    /// Legacy numeric view where `Missing` reads as the sentinel (0.0)
    pub fn sentinel_value(self) -> f64 {
        self.known().unwrap_or(MISSING_SENTINEL)
    }
}

/// A single row of the ratings table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub value: RatingValue,
}

impl Rating {
    pub fn new(user_id: UserId, movie_id: MovieId, value: RatingValue) -> Self {
        Self {
            user_id,
            movie_id,
            value,
        }
    }

    /// Shorthand for an observed rating
    pub fn known(user_id: UserId, movie_id: MovieId, value: f64) -> Self {
        Self::new(user_id, movie_id, RatingValue::Known(value))
    }

    /// Shorthand for a rating that still has to be predicted
    pub fn missing(user_id: UserId, movie_id: MovieId) -> Self {
        Self::new(user_id, movie_id, RatingValue::Missing)
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A user and every rating cell they own (one per movie)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub ratings: BTreeMap<MovieId, RatingValue>,
}

impl User {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            ratings: BTreeMap::new(),
        }
    }

    pub fn rating(&self, movie_id: MovieId) -> Option<RatingValue> {
        self.ratings.get(&movie_id).copied()
    }

    /// Observed ratings only, ascending by movie id
    pub fn known_ratings(&self) -> impl Iterator<Item = (MovieId, f64)> + '_ {
        self.ratings
            .iter()
            .filter_map(|(&movie_id, value)| value.known().map(|v| (movie_id, v)))
    }

    pub fn missing_count(&self) -> usize {
        self.ratings.values().filter(|v| v.is_missing()).count()
    }
}

/// A movie and every rating cell pointing at it, keyed by user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub ratings: BTreeMap<UserId, RatingValue>,
}

impl Movie {
    pub fn new(id: MovieId) -> Self {
        Self {
            id,
            ratings: BTreeMap::new(),
        }
    }

    /// Mean of the observed ratings, `None` when nobody rated it
    pub fn known_mean(&self) -> Option<f64> {
        let (sum, count) = self
            .ratings
            .values()
            .filter_map(|v| v.known())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        (count > 0).then(|| sum / count as f64)
    }

    /// Mean over every cell with `Missing` counted as the sentinel
    ///
    /// This is the fallback of the bug-compatible predictor; it includes
    /// the target user's own (missing) cell.
    pub fn sentinel_mean(&self) -> f64 {
        if self.ratings.is_empty() {
            return MISSING_SENTINEL;
        }
        let total: f64 = self.ratings.values().map(|v| v.sentinel_value()).sum();
        total / self.ratings.len() as f64
    }
}

// =============================================================================
// Statistics Types
// =============================================================================

/// Summary numbers for a loaded store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub users: usize,
    pub movies: usize,
    pub ratings: usize,
    pub missing: usize,
    /// Rows that overwrote an earlier row for the same (user, movie)
    pub duplicates: usize,
    pub global_mean: Option<f64>,
}

// =============================================================================
// RatingStore
// =============================================================================

/// Frozen store handed to the prediction phase
pub type StoreSnapshot = Arc<RatingStore>;

/// In-memory ratings indexed by user and by movie.
///
/// Built with [`RatingStore::insert_rating`] during ingestion, then turned
/// into a [`StoreSnapshot`] with [`RatingStore::freeze`]. The snapshot
/// exposes only `&self` methods, so the predict phase can't mutate it.
#[derive(Debug, Default)]
pub struct RatingStore {
    pub(crate) users: BTreeMap<UserId, User>,
    pub(crate) movies: BTreeMap<MovieId, Movie>,
    pub(crate) duplicates: usize,
    // running totals over known ratings, for the global mean
    pub(crate) known_sum: f64,
    pub(crate) known_count: usize,
}

impl RatingStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a user by ID
    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// All users, ascending by id
    pub fn users(&self) -> impl ExactSizeIterator<Item = &User> + '_ {
        self.users.values()
    }

    /// All movies, ascending by id
    pub fn movies(&self) -> impl ExactSizeIterator<Item = &Movie> + '_ {
        self.movies.values()
    }

    /// Insert a rating into both indexes, overwriting any earlier value
    /// for the same (user, movie)
    pub fn insert_rating(&mut self, rating: Rating) {
        let previous = self
            .users
            .entry(rating.user_id)
            .or_insert_with(|| User::new(rating.user_id))
            .ratings
            .insert(rating.movie_id, rating.value);

        self.movies
            .entry(rating.movie_id)
            .or_insert_with(|| Movie::new(rating.movie_id))
            .ratings
            .insert(rating.user_id, rating.value);

        if let Some(old) = previous {
            warn!(
                user_id = rating.user_id,
                movie_id = rating.movie_id,
                "Duplicate rating row, keeping the later value"
            );
            self.duplicates += 1;
            if let Some(v) = old.known() {
                self.known_sum -= v;
                self.known_count -= 1;
            }
        }
        if let Some(v) = rating.value.known() {
            self.known_sum += v;
            self.known_count += 1;
        }
    }

    /// Mean of every observed rating in the store
    pub fn global_mean(&self) -> Option<f64> {
        (self.known_count > 0).then(|| self.known_sum / self.known_count as f64)
    }

    /// Get counts for debugging/validation: (users, movies, rating cells)
    pub fn counts(&self) -> (usize, usize, usize) {
        let total_ratings = self.users.values().map(|u| u.ratings.len()).sum();
        (self.users.len(), self.movies.len(), total_ratings)
    }

    pub fn stats(&self) -> StoreStats {
        let (users, movies, ratings) = self.counts();
        StoreStats {
            users,
            movies,
            ratings,
            missing: self.users.values().map(User::missing_count).sum(),
            duplicates: self.duplicates,
            global_mean: self.global_mean(),
        }
    }

    /// End the ingestion phase
    pub fn freeze(self) -> StoreSnapshot {
        Arc::new(self)
    }
}
