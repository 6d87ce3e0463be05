//! # Data Loader Crate
//!
//! This crate loads a sparse ratings table into memory and writes the
//! completed table back out.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (User, Movie, Rating, RatingValue, RatingStore)
//! - **parser**: Parse the CSV ratings table into `Rating`s
//! - **index**: Build and validate the `RatingStore`
//! - **writer**: Write the `UserID,ItemID,rating` output table
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingStore;
//! use std::path::Path;
//!
//! // Phase one: load everything
//! let store = RatingStore::load_from_file(Path::new("train.csv"))?.freeze();
//!
//! // Phase two: read-only queries
//! let user = store.get_user(1).unwrap();
//! let movie = store.get_movie(1193).unwrap();
//! println!("User {} rated {} movies", user.id, user.ratings.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod index;
pub mod writer;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    StoreSnapshot,
    // Core types
    User,
    Movie,
    Rating,
    RatingValue,
    RatingStore,
    StoreStats,
    MISSING_SENTINEL,
};
pub use writer::{format_rating, RatingTableWriter, OUTPUT_HEADER};
