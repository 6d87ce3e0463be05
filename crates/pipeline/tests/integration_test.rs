//! Integration tests for the pipeline.
//!
//! These run the whole job the way the CLI does: CSV text in, completed
//! CSV text out.

use data_loader::{RatingStore, RatingTableWriter};
use pipeline::{BatchDriver, FilledRating};
use std::collections::HashSet;
use ubcf::{PredictionMode, Predictor};

const INPUT: &str = "\
userId,movieId,rating
4,13,0
1,10,5
1,11,3
1,12,1
1,13,4
2,10,4
2,11,3
2,12,2
2,13,5
3,10,1
3,11,3
3,12,5
3,13,1
4,10,5
4,11,3
4,12,1
5,14,0
";

fn run(input: &str, mode: PredictionMode, parallel: bool) -> (String, pipeline::BatchSummary) {
    let store = RatingStore::load_from_reader(input.as_bytes(), "inline.csv")
        .unwrap()
        .freeze();
    let driver = BatchDriver::new(Predictor::new(store).with_mode(mode)).with_parallel(parallel);

    let mut writer = RatingTableWriter::new(Vec::new()).unwrap();
    let summary = driver.run(&mut writer).unwrap();
    let output = String::from_utf8(writer.into_inner().unwrap()).unwrap();
    (output, summary)
}

fn data_lines(output: &str) -> Vec<&str> {
    output.lines().skip(1).collect()
}

#[test]
fn test_output_is_complete_and_unique() {
    let (output, summary) = run(INPUT, PredictionMode::Compatible, false);

    assert_eq!(output.lines().next(), Some("UserID,ItemID,rating"));

    let input_rows = INPUT.lines().skip(1).count();
    let lines = data_lines(&output);
    assert_eq!(lines.len(), input_rows);
    assert_eq!(summary.rows, input_rows);

    let pairs: HashSet<(&str, &str)> = lines
        .iter()
        .map(|line| {
            let mut fields = line.split(',');
            (fields.next().unwrap(), fields.next().unwrap())
        })
        .collect();
    assert_eq!(pairs.len(), input_rows);
}

#[test]
fn test_observed_ratings_pass_through() {
    let (output, _) = run(INPUT, PredictionMode::Weighted, false);
    let lines: HashSet<&str> = data_lines(&output).into_iter().collect();

    for row in INPUT.lines().skip(1).filter(|row| !row.ends_with(",0")) {
        assert!(lines.contains(row), "missing pass-through row {row}");
    }
}

#[test]
fn test_compatible_mode_zeroes_neighbor_predictions() {
    let (output, summary) = run(INPUT, PredictionMode::Compatible, false);
    let lines = data_lines(&output);

    // Neighbor-backed prediction collapses to 0; the lone rater of movie 14
    // falls back to the mean of its own missing cell.
    assert!(lines.contains(&"4,13,0"));
    assert!(lines.contains(&"5,14,0"));
    assert_eq!(summary.neighbor_predictions, 1);
    assert_eq!(summary.fallback_predictions, 1);
}

#[test]
fn test_weighted_mode_predicts_from_similar_users() {
    let (output, summary) = run(INPUT, PredictionMode::Weighted, false);
    let lines = data_lines(&output);

    // Users 1 and 2 match user 4 perfectly and rated movie 13 at 4 and 5
    assert!(lines.contains(&"4,13,4.5"));
    // Nobody else rated movie 14 -> global mean of observed ratings
    let global = (5.0 + 3.0 + 1.0 + 4.0 + 4.0 + 3.0 + 2.0 + 5.0 + 1.0 + 3.0 + 5.0 + 1.0 + 5.0 + 3.0 + 1.0) / 15.0;
    assert!(lines.contains(&format!("5,14,{}", global).as_str()));
    assert_eq!(summary.predicted, 2);
}

#[test]
fn test_output_is_deterministic() {
    let (first, _) = run(INPUT, PredictionMode::Weighted, false);
    let (second, _) = run(INPUT, PredictionMode::Weighted, false);
    let (parallel, _) = run(INPUT, PredictionMode::Weighted, true);

    assert_eq!(first, second);
    assert_eq!(first, parallel);
    assert!(data_lines(&first)[0].starts_with("1,10,"));
}

#[test]
fn test_fallback_to_movie_mean_with_single_other_rater() {
    // User 1 needs movie 10; only user 2 rated it and they share nothing else
    let input = "u,m,r\n1,10,0\n1,11,4\n2,10,3.5\n2,12,2\n";
    let (output, _) = run(input, PredictionMode::Weighted, false);
    assert!(data_lines(&output).contains(&"1,10,3.5"));
}

#[test]
fn test_duplicate_rows_keep_last_value() {
    let input = "\
userId,movieId,rating
1,10,5
1,11,3
2,10,4
1,10,2
2,11,0
2,11,1
";
    let store = RatingStore::load_from_reader(input.as_bytes(), "dupes.csv").unwrap();
    assert_eq!(store.stats().duplicates, 2);

    let (output, summary) = run(input, PredictionMode::Weighted, false);
    assert_eq!(
        data_lines(&output),
        vec!["1,10,2", "1,11,3", "2,10,4", "2,11,1"]
    );
    assert_eq!(summary.rows, 4);
    assert_eq!(summary.observed, 4);
    assert_eq!(summary.predicted, 0);
}

#[test]
fn test_empty_input_writes_header_only() {
    let (output, summary) = run("", PredictionMode::Compatible, false);
    assert_eq!(output, "UserID,ItemID,rating\n");
    assert_eq!(summary.rows, 0);
}

#[test]
fn test_malformed_input_is_rejected() {
    let input = "userId,movieId,rating\n1,10,5\n1,11,three\n";
    assert!(RatingStore::load_from_reader(input.as_bytes(), "bad.csv").is_err());
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("train.csv");
    let output_path = dir.path().join("output.csv");
    std::fs::write(&input_path, INPUT).unwrap();

    let store = RatingStore::load_from_file(&input_path).unwrap().freeze();
    let driver = BatchDriver::new(Predictor::new(store));
    let mut writer = RatingTableWriter::create(&output_path).unwrap();
    driver.run(&mut writer).unwrap();
    drop(writer);

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(written.lines().count(), INPUT.lines().count());
}

#[test]
fn test_vec_sink_collects_rows() {
    let store = RatingStore::load_from_reader(INPUT.as_bytes(), "inline.csv")
        .unwrap()
        .freeze();
    let mut rows: Vec<FilledRating> = Vec::new();
    BatchDriver::new(Predictor::new(store)).run(&mut rows).unwrap();
    assert_eq!(rows.len(), INPUT.lines().count() - 1);
}
