//! Criterion benchmarks for arbor-forest: tree and forest training and prediction.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use arbor_forest::{DecisionTreeConfig, RandomForestConfig, Record, Value};

fn make_classification(
    n_samples: usize,
    n_attributes: usize,
    n_classes: usize,
    seed: u64,
) -> Vec<Record> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|i| {
            let class = i % n_classes;
            let mut record = Record::new().with("class", format!("c{class}"));
            for f in 0..n_attributes {
                let base = if f < 3 { class as f64 * 3.0 } else { 0.0 };
                record.insert(format!("f{f:02}"), base + rng.r#gen::<f64>() * 0.5);
            }
            record
        })
        .collect()
}

fn bench_tree_train(c: &mut Criterion) {
    let dataset = make_classification(500, 20, 5, 42);
    let cfg = DecisionTreeConfig::new().with_seed(42);

    c.bench_function("tree_train_500x20_5class", |b| {
        b.iter(|| cfg.fit(&dataset, "class", Value::from("c0")).unwrap());
    });
}

fn bench_forest_train(c: &mut Criterion) {
    let dataset = make_classification(500, 20, 5, 42);
    let cfg = RandomForestConfig::new(50)
        .unwrap()
        .with_attributes_per_node(Some(5))
        .with_seed(42);

    c.bench_function("forest_train_500x20_5class_50trees", |b| {
        b.iter(|| cfg.fit(&dataset, "class").unwrap());
    });
}

fn bench_forest_predict_batch(c: &mut Criterion) {
    let dataset = make_classification(500, 20, 5, 42);
    let forest = RandomForestConfig::new(50)
        .unwrap()
        .with_seed(42)
        .fit(&dataset, "class")
        .unwrap();

    c.bench_function("forest_predict_batch_500x20_50trees", |b| {
        b.iter(|| forest.predict_batch(&dataset).unwrap());
    });
}

criterion_group!(
    benches,
    bench_tree_train,
    bench_forest_train,
    bench_forest_predict_batch
);
criterion_main!(benches);
