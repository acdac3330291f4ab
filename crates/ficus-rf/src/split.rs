//! Split evaluation and randomized split search.
//!
//! Instead of scanning every threshold, each node draws a fixed number of
//! random `(feature, threshold)` candidates and keeps the one with the
//! highest information gain.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::RfError;
use crate::node::{FeatureIndex, Impurity, SplitQuestion};
use crate::partition::LabelPartition;

/// Gini impurity of a partition: `1 - Σ(p_i²)` over label proportions.
///
/// # Errors
///
/// Returns [`RfError::EmptyPartition`] when the partition holds no vectors.
pub fn impurity(partition: &LabelPartition) -> Result<Impurity, RfError> {
    let n_samples = partition.total_count();
    if n_samples == 0 {
        return Err(RfError::EmptyPartition);
    }
    let n = n_samples as f64;
    let sum_sq: f64 = partition
        .label_counts()
        .map(|(_, c)| {
            let p = c as f64 / n;
            p * p
        })
        .sum();
    Ok(Impurity::new(1.0 - sum_sq))
}

/// Information gain of splitting `parent` into `left` and `right`.
///
/// `gain = impurity(parent) - (w · impurity(left) + (1 - w) · impurity(right))`
/// with `w = |left| / |parent|`. An empty side carries zero impurity.
///
/// # Errors
///
/// Returns [`RfError::EmptyPartition`] when `parent` holds no vectors.
pub fn information_gain(
    parent: &LabelPartition,
    left: &LabelPartition,
    right: &LabelPartition,
) -> Result<f64, RfError> {
    let parent_impurity = impurity(parent)?;
    gain_from(parent_impurity, parent.total_count(), left, right)
}

fn gain_from(
    parent_impurity: Impurity,
    n_parent: usize,
    left: &LabelPartition,
    right: &LabelPartition,
) -> Result<f64, RfError> {
    let side = |p: &LabelPartition| -> Result<f64, RfError> {
        if p.is_empty() {
            Ok(0.0)
        } else {
            Ok(impurity(p)?.value())
        }
    };
    let w = left.total_count() as f64 / n_parent as f64;
    Ok(parent_impurity.value() - (w * side(left)? + (1.0 - w) * side(right)?))
}

/// One randomly drawn split of a partition.
#[derive(Debug, Clone)]
pub struct CandidateSplit {
    /// Vectors with `x[feature] < threshold`.
    pub left: LabelPartition,
    /// Vectors with `x[feature] >= threshold`.
    pub right: LabelPartition,
    /// Feature and threshold that produced the split.
    pub question: SplitQuestion,
}

impl CandidateSplit {
    /// Return `true` if either side is empty.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.left.is_empty() || self.right.is_empty()
    }
}

/// Draw one random split of `partition`.
///
/// The feature is picked uniformly from `allowed_features`; the threshold is
/// the value of that feature on a vector picked uniformly from the whole
/// partition. Vectors strictly below the threshold go left, so the sampled
/// vector itself always goes right. Label grouping and order are preserved
/// on both sides.
///
/// An empty partition yields two empty sides and a threshold of `0.0`.
///
/// # Errors
///
/// | Variant                           | When                                          |
/// |-----------------------------------|-----------------------------------------------|
/// | [`RfError::NoAllowedFeatures`]    | `allowed_features` is empty                   |
/// | [`RfError::FeatureOutOfRange`]    | the drawn feature is past the vector length   |
/// | [`RfError::FeatureCountMismatch`] | a vector differs in length from the pivot     |
pub fn generate_candidate_split(
    partition: &LabelPartition,
    allowed_features: &[FeatureIndex],
    rng: &mut impl Rng,
) -> Result<CandidateSplit, RfError> {
    let feature = *allowed_features
        .choose(rng)
        .ok_or(RfError::NoAllowedFeatures)?;

    let n_samples = partition.total_count();
    if n_samples == 0 {
        return Ok(CandidateSplit {
            left: LabelPartition::new(),
            right: LabelPartition::new(),
            question: SplitQuestion::new(feature, 0.0),
        });
    }

    let position = rng.gen_range(0..n_samples);
    let (_, pivot) = partition
        .flat_get(position)
        .ok_or(RfError::EmptyPartition)?;
    let threshold = *pivot
        .get(feature.index())
        .ok_or(RfError::FeatureOutOfRange {
            feature: feature.index(),
            n_features: pivot.len(),
        })?;

    let n_features = pivot.len();
    let mut left = LabelPartition::new();
    let mut right = LabelPartition::new();
    for (label, vectors) in partition.iter() {
        let mut l = Vec::new();
        let mut r = Vec::new();
        for (position, v) in vectors.iter().enumerate() {
            if v.len() != n_features {
                return Err(RfError::FeatureCountMismatch {
                    expected: n_features,
                    got: v.len(),
                    label,
                    position,
                });
            }
            if v[feature.index()] < threshold {
                l.push(v.clone());
            } else {
                r.push(v.clone());
            }
        }
        left.extend_label(label, l);
        right.extend_label(label, r);
    }

    Ok(CandidateSplit {
        left,
        right,
        question: SplitQuestion::new(feature, threshold),
    })
}

/// Winner of a randomized split search.
#[derive(Debug, Clone)]
pub struct BestSplit {
    /// Information gain of `split`. Zero when `fallback` is set.
    pub gain: f64,
    /// The chosen split.
    pub split: CandidateSplit,
    /// Set when every candidate was degenerate and the first one was kept.
    pub fallback: bool,
}

/// Draw `n_candidates` random splits and keep the one with the highest gain.
///
/// Degenerate candidates (an empty side) are skipped. Among the rest the
/// first candidate with strictly greater gain wins. When every candidate is
/// degenerate the first one is returned with a gain of `0.0`, which the tree
/// builder treats as "no improving split".
///
/// # Errors
///
/// | Variant                            | When                            |
/// |------------------------------------|---------------------------------|
/// | [`RfError::InvalidCandidateCount`] | `n_candidates` is zero          |
/// | [`RfError::NoAllowedFeatures`]     | `allowed_features` is empty     |
/// | [`RfError::FeatureOutOfRange`]     | an allowed feature is too large |
/// | [`RfError::FeatureCountMismatch`]  | vectors differ in length        |
pub fn find_best_split(
    partition: &LabelPartition,
    n_candidates: usize,
    allowed_features: &[FeatureIndex],
    rng: &mut impl Rng,
) -> Result<BestSplit, RfError> {
    if n_candidates == 0 {
        return Err(RfError::InvalidCandidateCount { n_candidates });
    }

    let n_parent = partition.total_count();
    let mut parent_impurity: Option<Impurity> = None;
    let mut first: Option<CandidateSplit> = None;
    let mut best: Option<(f64, CandidateSplit)> = None;

    for _ in 0..n_candidates {
        let candidate = generate_candidate_split(partition, allowed_features, rng)?;
        if candidate.is_degenerate() {
            if first.is_none() {
                first = Some(candidate);
            }
            continue;
        }

        let parent = match parent_impurity {
            Some(imp) => imp,
            None => {
                let imp = impurity(partition)?;
                parent_impurity = Some(imp);
                imp
            }
        };
        let gain = gain_from(parent, n_parent, &candidate.left, &candidate.right)?;
        if best.as_ref().is_none_or(|(g, _)| gain > *g) {
            best = Some((gain, candidate));
        }
    }

    if let Some((gain, split)) = best {
        return Ok(BestSplit {
            gain,
            split,
            fallback: false,
        });
    }

    // n_candidates >= 1 and nothing was kept, so `first` is set.
    let split = first.ok_or(RfError::InvalidCandidateCount { n_candidates })?;
    Ok(BestSplit {
        gain: 0.0,
        split,
        fallback: true,
    })
}
