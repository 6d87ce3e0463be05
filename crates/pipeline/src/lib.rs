//! Batch pipeline that completes a ratings table.
//!
//! This crate provides:
//! - RatingSink trait for wherever completed rows go
//! - BatchDriver for the predict phase over a frozen store
//!
//! ## Architecture
//! A run has two phases:
//! 1. Load: the table is parsed into a `RatingStore` and frozen
//! 2. Predict: the driver walks every cell, passes observed values
//!    through, asks the `Predictor` for missing ones and streams rows out
//!
//! ## Example Usage
//! ```ignore
//! use data_loader::{RatingStore, RatingTableWriter};
//! use pipeline::BatchDriver;
//! use ubcf::Predictor;
//!
//! let store = RatingStore::load_from_file(input)?.freeze();
//! let driver = BatchDriver::new(Predictor::new(store));
//!
//! let mut writer = RatingTableWriter::create(output)?;
//! let summary = driver.run(&mut writer)?;
//! ```

pub mod traits;
pub mod batch;

// Re-export main types
pub use traits::{FilledRating, RatingOrigin, RatingSink};
pub use batch::{BatchDriver, BatchSummary};
