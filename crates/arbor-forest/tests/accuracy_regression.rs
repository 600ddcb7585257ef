//! Accuracy regression tests for arbor-forest.
//!
//! These tests verify that algorithmic changes do not degrade tree and
//! forest accuracy on deterministic synthetic datasets.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use arbor_forest::{
    DecisionTreeConfig, HoldoutSplit, Node, RandomForestConfig, Record, Value, entropy,
    information_gain, majority_label,
};

// ---------------------------------------------------------------------------
// Helpers: deterministic synthetic classification datasets
// ---------------------------------------------------------------------------

/// Generate an `n_samples`, 10-attribute, 3-class dataset.
///
/// Attributes f0-f2 are informative (class * `spacing` + noise in [0, 1]).
/// Attributes f3-f9 are pure noise in [0, 1].
/// Samples are assigned round-robin across classes.
fn make_classification(n_samples: usize, spacing: f64, seed: u64) -> Vec<Record> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|i| {
            let class = i % 3;
            let mut record = Record::new().with("class", format!("c{class}"));
            for f in 0..10 {
                let base = if f < 3 { class as f64 * spacing } else { 0.0 };
                record.insert(format!("f{f}"), base + rng.r#gen::<f64>());
            }
            record
        })
        .collect()
}

fn accuracy_of(predictions: &[&Value], dataset: &[Record]) -> f64 {
    let correct = predictions
        .iter()
        .zip(dataset)
        .filter(|&(p, r)| Some(*p) == r.get("class"))
        .count();
    correct as f64 / dataset.len() as f64
}

// ---------------------------------------------------------------------------
// Entropy and gain
// ---------------------------------------------------------------------------

#[test]
fn entropy_reference_values() {
    assert_eq!(entropy(&[7], 7), 0.0);
    assert!((entropy(&[4, 4], 8) - 1.0).abs() < 1e-12);
    assert!((entropy(&[1, 1, 1, 1], 4) - 2.0).abs() < 1e-12);
}

#[test]
fn proportion_preserving_split_has_zero_gain() {
    let gain = information_gain(&[4, 2], &[2, 1]);
    assert!(gain.abs() < 1e-12, "gain = {gain}");
    assert!(information_gain(&[2, 2], &[2, 0]) > 0.99);
}

// ---------------------------------------------------------------------------
// Decision tree properties
// ---------------------------------------------------------------------------

#[test]
fn four_points_split_at_midpoint() {
    let dataset: Vec<Record> = [(1.0, "A"), (2.0, "A"), (3.0, "B"), (4.0, "B")]
        .into_iter()
        .map(|(x, class)| Record::new().with("x", x).with("class", class))
        .collect();
    let tree = DecisionTreeConfig::new()
        .fit(&dataset, "class", Value::from("A"))
        .unwrap();

    let Node::Internal {
        split_attribute,
        split_threshold,
        lesser_child,
        greater_equal_child,
        ..
    } = tree.root()
    else {
        panic!("expected a split, got {:?}", tree.root());
    };
    assert_eq!(split_attribute, "x");
    assert!((split_threshold - 2.5).abs() < f64::EPSILON);
    assert_eq!(**lesser_child, Node::leaf(Value::from("A")));
    assert_eq!(**greater_equal_child, Node::leaf(Value::from("B")));
}

#[test]
fn zero_depth_is_single_majority_leaf() {
    let dataset = make_classification(90, 3.0, 1);
    let tree = DecisionTreeConfig::new()
        .with_max_depth(Some(0))
        .fit(&dataset, "class", Value::from("none"))
        .unwrap();
    assert_eq!(tree.n_nodes(), 1);
    assert_eq!(tree.root().predicted_class(), &Value::from("c0"));
}

#[test]
fn large_min_examples_is_single_majority_leaf() {
    let dataset: Vec<Record> = (0..10)
        .map(|i| {
            let class = if i < 6 { "yes" } else { "no" };
            Record::new().with("x", f64::from(i)).with("class", class)
        })
        .collect();
    let tree = DecisionTreeConfig::new()
        .with_min_examples_to_split(1000)
        .fit(&dataset, "class", Value::from("no"))
        .unwrap();
    assert!(tree.root().is_leaf());
    assert_eq!(tree.root().predicted_class(), &Value::from("yes"));
}

#[test]
fn unlimited_tree_overfits_training_data() {
    // Heavy class overlap, but every attribute vector is distinct.
    let dataset = make_classification(150, 0.2, 7);
    let tree = DecisionTreeConfig::new()
        .fit(&dataset, "class", Value::from("c0"))
        .unwrap();

    let predictions = tree.predict_batch(&dataset).unwrap();
    assert_eq!(accuracy_of(&predictions, &dataset), 1.0);
    assert!(tree.n_leaves() > 3);
}

#[test]
fn trained_tree_predicts_every_training_record() {
    let dataset = make_classification(120, 0.5, 3);
    let tree = DecisionTreeConfig::new()
        .with_max_depth(Some(4))
        .with_purity_threshold(0.9)
        .with_min_examples_to_split(5)
        .with_num_random_attributes(Some(3))
        .fit(&dataset, "class", Value::from("c0"))
        .unwrap();
    assert_eq!(tree.predict_batch(&dataset).unwrap().len(), dataset.len());
    assert!(tree.depth() <= 4);
}

#[test]
fn same_seed_same_tree() {
    let dataset = make_classification(120, 0.5, 3);
    let config = DecisionTreeConfig::new()
        .with_num_random_attributes(Some(2))
        .with_seed(17);
    let first = config.fit(&dataset, "class", Value::from("c0")).unwrap();
    let second = config.fit(&dataset, "class", Value::from("c0")).unwrap();
    assert_eq!(first, second);
}

/// Alternating labels along one attribute: every split peels off one record,
/// so an unlimited tree is as deep as the dataset is long.
#[test]
fn unlimited_tree_on_alternating_labels_is_one_level_per_record() {
    let n_records = 10_000;
    let dataset: Vec<Record> = (0..n_records)
        .map(|i| {
            let class = if i % 2 == 0 { "A" } else { "B" };
            Record::new().with("x", i as f64).with("class", class)
        })
        .collect();

    let tree = DecisionTreeConfig::new()
        .fit(&dataset, "class", Value::from("A"))
        .unwrap();
    assert_eq!(tree.depth(), n_records - 1);
    assert_eq!(tree.n_leaves(), n_records);

    for record in dataset.iter().step_by(97) {
        assert_eq!(tree.predict(record).unwrap(), record.get("class").unwrap());
    }

    let copy = tree.clone();
    assert!(copy == tree);
}

// ---------------------------------------------------------------------------
// Random forest accuracy
// ---------------------------------------------------------------------------

/// Holdout accuracy on well-separated classes must exceed 0.9.
#[test]
fn forest_holdout_accuracy_above_threshold() {
    let dataset = make_classification(300, 3.0, 42);
    let (train, test) = HoldoutSplit::new(0.8).unwrap().with_seed(42).split(&dataset);

    let forest = RandomForestConfig::new(50)
        .unwrap()
        .with_max_depth(Some(10))
        .with_attributes_per_node(Some(3))
        .with_seed(42)
        .fit(&train, "class")
        .unwrap();

    let test_accuracy = forest.evaluate(&test, "class").unwrap();
    assert!(test_accuracy > 0.9, "test accuracy {test_accuracy} <= 0.9");
}

/// A large forest must not do clearly worse than a single bagged tree.
#[test]
fn more_trees_not_worse() {
    let dataset = make_classification(300, 0.6, 11);
    let (train, test) = HoldoutSplit::new(0.8).unwrap().with_seed(11).split(&dataset);

    let accuracy_with = |n_trees: usize| {
        RandomForestConfig::new(n_trees)
            .unwrap()
            .with_seed(11)
            .fit(&train, "class")
            .unwrap()
            .evaluate(&test, "class")
            .unwrap()
    };
    let single = accuracy_with(1);
    let many = accuracy_with(50);
    assert!(
        many >= single - 0.05,
        "50 trees: {many}, 1 tree: {single}"
    );
}

#[test]
fn trained_forest_predicts_every_training_record() {
    let dataset = make_classification(90, 0.5, 5);
    let forest = RandomForestConfig::new(10)
        .unwrap()
        .with_attributes_per_node(Some(2))
        .fit(&dataset, "class")
        .unwrap();
    let predictions = forest.predict_batch(&dataset).unwrap();
    assert_eq!(predictions.len(), dataset.len());
}

#[test]
fn forest_default_class_is_dataset_majority() {
    let dataset = make_classification(91, 3.0, 2);
    // 91 round-robin records: c0 appears 31 times.
    assert_eq!(majority_label(&dataset, "class").unwrap(), Value::from("c0"));

    let forest = RandomForestConfig::new(3)
        .unwrap()
        .with_max_depth(Some(0))
        .fit(&dataset, "class")
        .unwrap();
    assert!(forest.trees().iter().all(|tree| tree.root().is_leaf()));
}
