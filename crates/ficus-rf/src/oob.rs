//! Out-of-bag (OOB) evaluation.

use tracing::debug;

use crate::confusion::ConfusionMatrix;
use crate::error::RfError;
use crate::predict::argmax_lowest;
use crate::tree::DecisionTree;

/// Accuracy of the forest measured on vectors each tree did not train on.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// Fraction of OOB-evaluated vectors whose OOB vote matched their label.
    pub accuracy: f64,
    pub confusion_matrix: ConfusionMatrix,
    /// Number of vectors left out by at least one tree.
    pub n_oob_samples: usize,
}

/// Vote every vector using only the trees that did not sample it.
///
/// `oob_positions_per_tree[t]` lists the flattened positions tree `t` left
/// out. Vectors no tree left out are skipped.
///
/// # Errors
///
/// Returns [`RfError::OobEvaluationFailed`] when no vector was left out by
/// any tree.
pub(crate) fn compute_oob(
    trees: &[DecisionTree],
    features: &[Vec<f64>],
    labels: &[usize],
    n_labels: usize,
    oob_positions_per_tree: &[Vec<usize>],
) -> Result<OobScore, RfError> {
    let mut tallies: Vec<Option<Vec<usize>>> = vec![None; features.len()];

    for (tree, positions) in trees.iter().zip(oob_positions_per_tree) {
        for &pos in positions {
            let label = tree.classify(&features[pos])?;
            let tally = tallies[pos].get_or_insert_with(|| vec![0; n_labels]);
            tally[label] += 1;
        }
    }

    let mut confusion_matrix = ConfusionMatrix::zeros(n_labels);
    for (tally, &truth) in tallies.iter().zip(labels) {
        if let Some(tally) = tally
            && let Some(predicted) = argmax_lowest(tally)
        {
            confusion_matrix.record(truth, predicted)?;
        }
    }

    let n_oob_samples = confusion_matrix.total();
    if n_oob_samples == 0 {
        return Err(RfError::OobEvaluationFailed {
            reason: "every vector was sampled by every tree".to_string(),
        });
    }
    let accuracy = confusion_matrix.accuracy();
    debug!(n_oob_samples, accuracy, "out-of-bag evaluation");

    Ok(OobScore {
        accuracy,
        confusion_matrix,
        n_oob_samples,
    })
}
