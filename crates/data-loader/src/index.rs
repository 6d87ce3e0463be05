//! RatingStore building and validation.
//!
//! Loading is the first of the two phases: parse the whole table, ingest
//! every row into both indexes, check that the indexes agree, and only
//! then let anyone predict.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument};

impl RatingStore {
    /// Load a ratings table from disk
    ///
    /// Steps:
    /// 1. Parse the file (any malformed row aborts the load)
    /// 2. Ingest every rating into the user and movie indexes
    /// 3. Validate that both indexes agree
    #[instrument]
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading ratings table from {:?}", path);
        let ratings = parser::parse_ratings(path)?;
        Self::from_ratings(ratings)
    }

    /// Load a ratings table from any reader
    pub fn load_from_reader<R: Read>(reader: R, source: &str) -> Result<Self> {
        let ratings = parser::parse_ratings_from_reader(reader, source)?;
        Self::from_ratings(ratings)
    }

    /// Build and validate a store from already parsed ratings
    pub fn from_ratings(ratings: impl IntoIterator<Item = Rating>) -> Result<Self> {
        let mut store = RatingStore::new();
        for rating in ratings {
            store.insert_rating(rating);
        }
        store.validate()?;

        let stats = store.stats();
        info!(
            users = stats.users,
            movies = stats.movies,
            ratings = stats.ratings,
            missing = stats.missing,
            duplicates = stats.duplicates,
            "Rating store built and validated"
        );
        Ok(store)
    }

    /// Validate data integrity
    ///
    /// Check that every cell in the user index has an identical mirror in
    /// the movie index, and the other way round.
    pub fn validate(&self) -> Result<()> {
        for user in self.users.values() {
            for (&movie_id, value) in &user.ratings {
                let movie = self.movies.get(&movie_id).ok_or_else(|| {
                    DataLoadError::MissingReference {
                        entity: "Movie".to_string(),
                        id: movie_id,
                    }
                })?;
                if movie.ratings.get(&user.id) != Some(value) {
                    return Err(DataLoadError::MissingReference {
                        entity: format!("Rating of movie {movie_id} by user"),
                        id: user.id,
                    });
                }
            }
        }

        for movie in self.movies.values() {
            for (&user_id, value) in &movie.ratings {
                let user = self.users.get(&user_id).ok_or_else(|| {
                    DataLoadError::MissingReference {
                        entity: "User".to_string(),
                        id: user_id,
                    }
                })?;
                if user.ratings.get(&movie.id) != Some(value) {
                    return Err(DataLoadError::MissingReference {
                        entity: format!("Rating by user {user_id} of movie"),
                        id: movie.id,
                    });
                }
            }
        }
        Ok(())
    }
}
