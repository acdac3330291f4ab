//! Majority-vote inference for the Random Forest ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::tree::DecisionTree;

/// Index of the largest tally entry; ties go to the lowest index.
pub(crate) fn argmax_lowest(tally: &[usize]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (label, &count) in tally.iter().enumerate() {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Tally one vote per prediction and return the winning label.
///
/// The tally has `n_labels` slots indexed by label; ties go to the lowest
/// label.
///
/// # Errors
///
/// | Variant                      | When                                   |
/// |------------------------------|----------------------------------------|
/// | [`RfError::LabelOutOfRange`] | a prediction is `>= n_labels`          |
/// | [`RfError::EmptyForest`]     | `predictions` is empty                 |
pub fn majority_vote(
    predictions: impl IntoIterator<Item = usize>,
    n_labels: usize,
) -> Result<usize, RfError> {
    let mut tally = vec![0usize; n_labels];
    let mut n_votes = 0usize;
    for label in predictions {
        *tally
            .get_mut(label)
            .ok_or(RfError::LabelOutOfRange { label, n_labels })? += 1;
        n_votes += 1;
    }
    if n_votes == 0 {
        return Err(RfError::EmptyForest);
    }
    argmax_lowest(&tally).ok_or(RfError::EmptyForest)
}

impl RandomForest {
    /// Predict the label of a single sample by majority vote of all trees.
    ///
    /// Ties go to the lowest label.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn classify(&self, sample: &[f64]) -> Result<usize, RfError> {
        self.check_sample(sample)?;
        let predictions = self
            .trees
            .iter()
            .map(|tree| tree.classify(sample))
            .collect::<Result<Vec<_>, _>>()?;
        majority_vote(predictions, self.n_labels)
    }

    /// Return the per-label vote tally for a single sample.
    ///
    /// The returned `Vec` has length `n_labels` and sums to `n_trees`.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn votes(&self, sample: &[f64]) -> Result<Vec<usize>, RfError> {
        self.check_sample(sample)?;
        let mut tally = vec![0usize; self.n_labels];
        for tree in &self.trees {
            let label = tree.classify(sample)?;
            tally[label] += 1;
        }
        Ok(tally)
    }

    /// Predict labels for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong feature count.
    pub fn classify_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        samples
            .into_par_iter()
            .map(|sample| self.classify(sample))
            .collect()
    }

    /// Return the trees of the ensemble, in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the size of the vote tally (largest training label + 1).
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    fn check_sample(&self, sample: &[f64]) -> Result<(), RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(())
    }
}
