//! End-to-end integration tests: CSV -> holdout split -> tree/forest -> accuracy.

use std::path::Path;

use arbor_forest::{DecisionTreeConfig, HoldoutSplit, RandomForestConfig, Value};
use arbor_io::{DatasetReader, IoError};

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn tree_round_trip() {
    let dataset = DatasetReader::new(&fixture_path("wine_small.csv"))
        .read()
        .expect("fixture should parse");
    assert_eq!(dataset.n_records(), 30);

    let tree = DecisionTreeConfig::new()
        .fit(dataset.records(), dataset.target(), Value::from("1"))
        .unwrap();

    // Classes are separable, so a fully grown tree needs one leaf per class.
    let accuracy = tree.evaluate(dataset.records(), dataset.target()).unwrap();
    assert!((accuracy - 1.0).abs() < f64::EPSILON, "accuracy = {accuracy}");
    assert_eq!(tree.n_leaves(), 3);

    let rendered = tree.to_string();
    assert!(rendered.contains("if malic_acid <"), "tree:\n{rendered}");
}

#[test]
fn forest_holdout_round_trip() {
    let records = DatasetReader::new(&fixture_path("wine_small.csv"))
        .read()
        .unwrap()
        .into_records();

    let (train, test) = HoldoutSplit::new(0.8).unwrap().with_seed(42).split(&records);
    assert_eq!(train.len(), 24);
    assert_eq!(test.len(), 6);

    let forest = RandomForestConfig::new(25)
        .unwrap()
        .with_max_depth(Some(10))
        .with_seed(42)
        .fit(&train, "class")
        .unwrap();

    let train_accuracy = forest.evaluate(&train, "class").unwrap();
    let test_accuracy = forest.evaluate(&test, "class").unwrap();
    assert!(train_accuracy > 0.9, "train accuracy = {train_accuracy}");
    assert!(test_accuracy > 0.6, "test accuracy = {test_accuracy}");

    let predictions = forest.predict_batch(&test).unwrap();
    assert_eq!(predictions.len(), test.len());
}

#[test]
fn headerless_matches_headered() {
    let headered = DatasetReader::new(&fixture_path("wine_small.csv"))
        .read()
        .unwrap();
    let headerless = DatasetReader::new(&fixture_path("wine_small_headerless.csv"))
        .with_delimiter(b';')
        .with_column_names(
            ["class", "alcohol", "malic_acid", "ash"]
                .map(String::from)
                .to_vec(),
        )
        .read()
        .unwrap();
    assert_eq!(headered.records(), headerless.records());
}

#[test]
fn reader_fixture_files_match_expected_errors() {
    let result = DatasetReader::new(&fixture_path("empty.csv")).read();
    assert!(
        matches!(result, Err(IoError::EmptyDataset { .. })),
        "empty.csv should give EmptyDataset, got: {result:?}"
    );

    let result = DatasetReader::new(&fixture_path("jagged.csv")).read();
    assert!(
        matches!(result, Err(IoError::InconsistentRowLength { .. })),
        "jagged.csv should give InconsistentRowLength, got: {result:?}"
    );

    let result = DatasetReader::new(&fixture_path("non_finite.csv")).read();
    assert!(
        matches!(result, Err(IoError::NonFiniteValue { .. })),
        "non_finite.csv should give NonFiniteValue, got: {result:?}"
    );

    let result = DatasetReader::new(&fixture_path("wine_small.csv"))
        .with_target("quality")
        .read();
    assert!(
        matches!(result, Err(IoError::UnknownTarget { .. })),
        "missing target should give UnknownTarget, got: {result:?}"
    );
}
