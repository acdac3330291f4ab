//! Criterion benchmarks for ficus-rf: Random Forest training and inference.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ficus_rf::{DecisionTreeConfig, LabelPartition, RandomForestConfig};

fn make_classification(
    n_samples: usize,
    n_features: usize,
    n_labels: usize,
    seed: u64,
) -> LabelPartition {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|i| {
            let label = i % n_labels;
            let row: Vec<f64> = (0..n_features)
                .map(|f| {
                    let base = if f < 3 { label as f64 * 3.0 } else { 0.0 };
                    base + rng.r#gen::<f64>() * 0.5
                })
                .collect();
            (label, row)
        })
        .collect()
}

fn bench_rf_train(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let cfg = RandomForestConfig::new(50, 300).unwrap().with_seed(42);

    c.bench_function("rf_train_500x20_5label_50trees", |b| {
        b.iter(|| cfg.fit(&data).unwrap());
    });
}

fn bench_rf_classify_batch(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let cfg = RandomForestConfig::new(50, 300).unwrap().with_seed(42);
    let forest = cfg.fit(&data).unwrap().into_forest();
    let (features, _) = data.to_labeled();

    c.bench_function("rf_classify_batch_500x20_50trees", |b| {
        b.iter(|| forest.classify_batch(&features).unwrap());
    });
}

fn bench_single_tree(c: &mut Criterion) {
    let data = make_classification(500, 20, 5, 42);
    let cfg = DecisionTreeConfig::new().with_max_depth(8).with_seed(42);

    c.bench_function("rf_single_tree_500x20_5label", |b| {
        b.iter(|| cfg.fit(&data).unwrap());
    });
}

criterion_group!(benches, bench_rf_train, bench_rf_classify_batch, bench_single_tree);
criterion_main!(benches);
