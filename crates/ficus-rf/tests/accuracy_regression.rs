//! Accuracy regression tests for ficus-rf.
//!
//! These tests verify that algorithmic changes do not degrade Random Forest
//! classification accuracy on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use ficus_rf::{LabelPartition, MaxFeatures, OobMode, RandomForestConfig, RfError, score};

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic classification dataset
// ---------------------------------------------------------------------------

/// Generate a 300-vector, 10-feature, 3-label dataset.
///
/// Features 0-2 are informative (label * 3.0 + noise in [0, 0.5]).
/// Features 3-9 are pure noise in [0, 0.5].
/// Vectors are assigned round-robin across labels.
fn make_classification() -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let n_samples = 300;
    let n_features = 10;
    let n_labels = 3;

    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let label = i % n_labels;
        labels.push(label);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { label as f64 * 3.0 } else { 0.0 };
                base + rng.r#gen::<f64>() * 0.5
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn partition() -> LabelPartition {
    let (features, labels) = make_classification();
    LabelPartition::from_labeled(&features, &labels).unwrap()
}

// ---------------------------------------------------------------------------
// a) training accuracy
// ---------------------------------------------------------------------------

/// Training accuracy with 100 trees must exceed 0.90.
#[test]
fn prediction_accuracy_on_training_data() {
    let data = partition();
    let result = RandomForestConfig::new(100, 200)
        .unwrap()
        .with_seed(42)
        .fit(&data)
        .unwrap();

    let (features, labels) = data.to_labeled();
    let predictions = result.forest().classify_batch(&features).unwrap();
    let accuracy = score(&predictions, &labels).unwrap();
    assert!(accuracy > 0.90, "training accuracy {accuracy} <= 0.90");
}

// ---------------------------------------------------------------------------
// b) OOB accuracy
// ---------------------------------------------------------------------------

/// OOB accuracy with 100 trees must exceed 0.80.
#[test]
fn oob_accuracy_above_threshold() {
    let data = partition();
    let result = RandomForestConfig::new(100, 200)
        .unwrap()
        .with_seed(42)
        .with_oob_mode(OobMode::Enabled)
        .fit(&data)
        .unwrap();

    let oob = result
        .oob_score()
        .expect("OOB score must be computed when OobMode::Enabled");
    assert!(oob.accuracy > 0.80, "oob_accuracy {} <= 0.80", oob.accuracy);
    assert_eq!(oob.n_oob_samples, 300);
    assert_eq!(oob.confusion_matrix.total(), 300);
    assert_eq!(oob.confusion_matrix.n_labels(), 3);
}

// ---------------------------------------------------------------------------
// c) held-out accuracy
// ---------------------------------------------------------------------------

/// Unseen vectors at the centre of each label band must get that label.
#[test]
fn held_out_accuracy_above_threshold() {
    let data = partition();
    let result = RandomForestConfig::new(60, 150)
        .unwrap()
        .with_max_features(MaxFeatures::All)
        .with_seed(7)
        .fit(&data)
        .unwrap();

    // midpoints of each label's informative band, noise features mid-range
    let queries: Vec<Vec<f64>> = (0..3)
        .map(|label| {
            (0..10)
                .map(|f| if f < 3 { label as f64 * 3.0 + 0.25 } else { 0.25 })
                .collect()
        })
        .collect();
    let predictions = result.forest().classify_batch(&queries).unwrap();
    assert_eq!(predictions, vec![0, 1, 2]);
}

// ---------------------------------------------------------------------------
// d) determinism
// ---------------------------------------------------------------------------

/// Same config and seed must produce identical predictions across two independent runs.
#[test]
fn deterministic_predictions() {
    let data = partition();
    let config = RandomForestConfig::new(50, 200).unwrap().with_seed(42);

    let (features, _) = data.to_labeled();
    let preds1 = config
        .fit(&data)
        .unwrap()
        .forest()
        .classify_batch(&features)
        .unwrap();
    let preds2 = config
        .fit(&data)
        .unwrap()
        .forest()
        .classify_batch(&features)
        .unwrap();

    assert_eq!(preds1, preds2, "predictions differ across runs with the same seed");
}

// ---------------------------------------------------------------------------
// e) per-tree shape
// ---------------------------------------------------------------------------

/// Every tree sees `sample_size` vectors and `floor(sqrt(10)) + 1 = 4` features.
#[test]
fn trees_respect_sample_and_feature_budget() {
    let data = partition();
    let result = RandomForestConfig::new(20, 120)
        .unwrap()
        .with_max_depth(4)
        .fit(&data)
        .unwrap();

    for tree in result.forest().trees() {
        assert_eq!(tree.root().n_samples(), 120);
        assert_eq!(tree.features().len(), 4);
        assert!(tree.depth() <= 4);
        let mut stack = vec![tree.root()];
        while let Some(node) = stack.pop() {
            if let (Some(q), Some((l, r))) = (node.question(), node.children()) {
                assert!(tree.features().contains(&q.feature));
                stack.extend(tree.node(l));
                stack.extend(tree.node(r));
            }
        }
    }
    for oob in result.oob_positions_per_tree() {
        assert_eq!(oob.len(), 300 - 120);
    }
}

// ---------------------------------------------------------------------------
// f) error surface
// ---------------------------------------------------------------------------

#[test]
fn wrong_query_width_is_rejected() {
    let data = partition();
    let forest = RandomForestConfig::new(5, 50)
        .unwrap()
        .fit(&data)
        .unwrap()
        .into_forest();
    assert!(matches!(
        forest.classify(&[0.0; 3]).unwrap_err(),
        RfError::PredictionFeatureMismatch {
            expected: 10,
            got: 3
        }
    ));
}
