use anyhow::{Context, Result};
use data_loader::RatingStore;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("train.csv"));

    println!("Loading ratings table {}...\n", path.display());

    let start = Instant::now();
    let store = RatingStore::load_from_file(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let elapsed = start.elapsed();

    let stats = store.stats();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", stats.users);
    println!("Movies: {}", stats.movies);
    println!("Ratings: {} ({} to predict)", stats.ratings, stats.missing);
    println!("Duplicates overwritten: {}", stats.duplicates);
    println!("\nPerformance: {:.0} ratings/second",
             stats.ratings as f64 / elapsed.as_secs_f64());
    Ok(())
}
