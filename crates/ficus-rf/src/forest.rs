//! Random Forest training.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument, trace};

use crate::config::{OobMode, RandomForestConfig};
use crate::error::RfError;
use crate::node::Node;
use crate::oob::compute_oob;
use crate::partition::LabelPartition;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::sample::{sample_features, sample_positions};
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted Random Forest ensemble. Immutable once built.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_labels: usize,
}

impl RandomForest {
    /// Assemble a forest from already built trees.
    ///
    /// `n_labels` sizes the vote tally; every leaf label must be below it.
    ///
    /// # Errors
    ///
    /// | Variant                                | When                                     |
    /// |----------------------------------------|------------------------------------------|
    /// | [`RfError::EmptyForest`]               | `trees` is empty                         |
    /// | [`RfError::PredictionFeatureMismatch`] | trees disagree on the feature count      |
    /// | [`RfError::LabelOutOfRange`]           | a leaf predicts a label `>= n_labels`    |
    pub fn from_trees(trees: Vec<DecisionTree>, n_labels: usize) -> Result<Self, RfError> {
        let n_features = trees.first().ok_or(RfError::EmptyForest)?.n_features();
        for tree in &trees {
            if tree.n_features() != n_features {
                return Err(RfError::PredictionFeatureMismatch {
                    expected: n_features,
                    got: tree.n_features(),
                });
            }
            if let Some(label) = tree.nodes.iter().filter_map(leaf_prediction).max()
                && label >= n_labels
            {
                return Err(RfError::LabelOutOfRange { label, n_labels });
            }
        }
        Ok(Self {
            trees,
            n_features,
            n_labels,
        })
    }
}

fn leaf_prediction(node: &Node) -> Option<usize> {
    match node {
        Node::Leaf { prediction, .. } => Some(*prediction),
        Node::Split { .. } => None,
    }
}

/// Return the flattened positions of `0..n_samples` absent from `in_bag`.
fn out_of_bag(n_samples: usize, in_bag: &[usize]) -> Vec<usize> {
    let mut seen = vec![false; n_samples];
    for &p in in_bag {
        seen[p] = true;
    }
    (0..n_samples).filter(|&p| !seen[p]).collect()
}

/// Train the Random Forest ensemble.
///
/// Each tree gets its own ChaCha8 stream seeded from a master stream, draws
/// `sample_size` vectors without replacement and a random feature subset,
/// then grows independently of every other tree.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = data.total_count()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    data: &LabelPartition,
) -> Result<RandomForestResult, RfError> {
    // --- Validate inputs ---
    let n_features = data.validate()?;
    let n_samples = data.total_count();

    // --- Validate config ---
    if config.sample_size > n_samples {
        return Err(RfError::SampleSizeTooLarge {
            requested: config.sample_size,
            available: n_samples,
        });
    }
    if config.n_candidates == 0 {
        return Err(RfError::InvalidCandidateCount {
            n_candidates: config.n_candidates,
        });
    }
    let max_features_resolved = config.max_features.resolve(n_features)?;
    let n_labels = data.max_label().map_or(0, |label| label + 1);

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_labels,
        sample_size = config.sample_size,
        max_features = max_features_resolved,
        "training random forest"
    );

    // Generate per-tree seeds from master RNG.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let tree_config = DecisionTreeConfig::new()
        .with_n_candidates(config.n_candidates)
        .with_max_depth(config.max_depth);

    let mut trees = Vec::with_capacity(config.n_trees);
    let mut oob_positions_per_tree = Vec::with_capacity(config.n_trees);
    for (tree_idx, seed) in tree_seeds.into_iter().enumerate() {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let positions = sample_positions(n_samples, config.sample_size, &mut rng)?;
        let features = sample_features(n_features, max_features_resolved, &mut rng)?;
        let tree = tree_config.build(data.select(&positions), features, &mut rng)?;

        debug!(
            tree = tree_idx,
            features = ?tree.features(),
            depth = tree.depth(),
            n_nodes = tree.n_nodes(),
            "tree trained"
        );
        trace!(tree = tree_idx, "\n{tree}");

        oob_positions_per_tree.push(out_of_bag(n_samples, &positions));
        trees.push(tree);
    }

    // OOB evaluation.
    let oob_score = if config.oob_mode == OobMode::Enabled {
        let (features, labels) = data.to_labeled();
        Some(compute_oob(
            &trees,
            &features,
            &labels,
            n_labels,
            &oob_positions_per_tree,
        )?)
    } else {
        None
    };

    let forest = RandomForest {
        trees,
        n_features,
        n_labels,
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_labels,
        n_samples,
        sample_size: config.sample_size,
        max_features_resolved,
    };

    info!(
        oob_accuracy = oob_score.as_ref().map(|s| s.accuracy),
        "random forest training complete"
    );

    Ok(RandomForestResult::new(
        forest,
        oob_score,
        oob_positions_per_tree,
        metadata,
    ))
}
