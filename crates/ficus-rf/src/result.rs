//! Training result types for Random Forest.

use crate::forest::RandomForest;
use crate::oob::OobScore;

/// Metadata about the training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingMetadata {
    pub n_trees: usize,
    /// Feature columns per vector.
    pub n_features: usize,
    /// Size of the vote tally (largest label + 1).
    pub n_labels: usize,
    /// Vectors in the training dataset.
    pub n_samples: usize,
    /// Vectors drawn per tree.
    pub sample_size: usize,
    /// Features each tree was allowed to split on.
    pub max_features_resolved: usize,
}

/// Result of Random Forest training.
///
/// Holds the fitted forest, the optional OOB score, the positions each tree
/// left out, and training metadata.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    oob_score: Option<OobScore>,
    oob_positions_per_tree: Vec<Vec<usize>>,
    metadata: TrainingMetadata,
}

impl RandomForestResult {
    pub(crate) fn new(
        forest: RandomForest,
        oob_score: Option<OobScore>,
        oob_positions_per_tree: Vec<Vec<usize>>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            forest,
            oob_score,
            oob_positions_per_tree,
            metadata,
        }
    }

    /// Borrow the fitted forest.
    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Consume the result and return the fitted forest.
    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Return the OOB score, if computed.
    #[must_use]
    pub fn oob_score(&self) -> Option<&OobScore> {
        self.oob_score.as_ref()
    }

    /// Flattened dataset positions each tree did not sample, ascending.
    #[must_use]
    pub fn oob_positions_per_tree(&self) -> &[Vec<usize>] {
        &self.oob_positions_per_tree
    }

    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}
