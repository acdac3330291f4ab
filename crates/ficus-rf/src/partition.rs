//! Label-grouped dataset representation.
//!
//! A [`LabelPartition`] maps each label to the ordered vectors carrying it.
//! It is both the training dataset handed to the forest and every subset
//! produced by a split inside a tree.

use std::collections::BTreeMap;

use crate::error::RfError;

/// One observation: a value per feature column.
pub type FeatureVector = Vec<f64>;

/// Mapping from label to the ordered sequence of vectors with that label.
///
/// Label groups are kept in ascending label order and are never empty, so
/// "first encountered label" always means "lowest label".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPartition {
    groups: BTreeMap<usize, Vec<FeatureVector>>,
}

impl LabelPartition {
    /// Create an empty partition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a partition from row-major vectors and their labels.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::LabelCountMismatch`] when `features` and `labels` differ in length.
    pub fn from_labeled(features: &[Vec<f64>], labels: &[usize]) -> Result<Self, RfError> {
        if features.len() != labels.len() {
            return Err(RfError::LabelCountMismatch {
                n_vectors: features.len(),
                n_labels: labels.len(),
            });
        }
        Ok(features
            .iter()
            .zip(labels)
            .map(|(row, &label)| (label, row.clone()))
            .collect())
    }

    /// Append one vector to the group of `label`.
    pub fn push(&mut self, label: usize, vector: FeatureVector) {
        self.groups.entry(label).or_default().push(vector);
    }

    /// Append a whole group of vectors under `label`. Empty groups are ignored.
    pub fn extend_label(&mut self, label: usize, vectors: Vec<FeatureVector>) {
        if vectors.is_empty() {
            return;
        }
        self.groups.entry(label).or_default().extend(vectors);
    }

    /// Total number of vectors across all labels.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Return `true` if the partition holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct labels present.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.groups.len()
    }

    /// Largest label present, if any.
    #[must_use]
    pub fn max_label(&self) -> Option<usize> {
        self.groups.keys().next_back().copied()
    }

    /// Labels present, ascending.
    pub fn labels(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.keys().copied()
    }

    /// Vectors carrying `label`, if any.
    #[must_use]
    pub fn group(&self, label: usize) -> Option<&[FeatureVector]> {
        self.groups.get(&label).map(Vec::as_slice)
    }

    /// Iterate `(label, vectors)` pairs in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[FeatureVector])> + '_ {
        self.groups.iter().map(|(&label, v)| (label, v.as_slice()))
    }

    /// Iterate `(label, count)` pairs in ascending label order.
    pub fn label_counts(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.groups.iter().map(|(&label, v)| (label, v.len()))
    }

    /// Iterate every `(label, vector)` pair in flattened order.
    ///
    /// Flattened position `i` is the `i`-th item of this iterator.
    pub fn flat_iter(&self) -> impl Iterator<Item = (usize, &FeatureVector)> + '_ {
        self.groups
            .iter()
            .flat_map(|(&label, v)| v.iter().map(move |x| (label, x)))
    }

    /// Return the vector at a flattened position, with its label.
    #[must_use]
    pub fn flat_get(&self, mut position: usize) -> Option<(usize, &FeatureVector)> {
        for (&label, vectors) in &self.groups {
            if position < vectors.len() {
                return Some((label, &vectors[position]));
            }
            position -= vectors.len();
        }
        None
    }

    /// Label with the largest vector count; ties go to the lowest label.
    #[must_use]
    pub fn majority_label(&self) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for (label, count) in self.label_counts() {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((label, count));
            }
        }
        best.map(|(label, _)| label)
    }

    /// Number of features per vector, taken from the first vector.
    #[must_use]
    pub fn n_features(&self) -> Option<usize> {
        self.flat_iter().next().map(|(_, v)| v.len())
    }

    /// Check the partition is usable as a training set.
    ///
    /// Returns the uniform number of features on success.
    ///
    /// # Errors
    ///
    /// | Variant                           | When                                  |
    /// |-----------------------------------|---------------------------------------|
    /// | [`RfError::EmptyDataset`]         | the partition holds no vectors        |
    /// | [`RfError::ZeroFeatures`]         | vectors have zero feature columns     |
    /// | [`RfError::FeatureCountMismatch`] | vectors have inconsistent lengths     |
    /// | [`RfError::NonFiniteValue`]       | any value is NaN or infinite          |
    pub fn validate(&self) -> Result<usize, RfError> {
        let n_features = self.n_features().ok_or(RfError::EmptyDataset)?;
        if n_features == 0 {
            return Err(RfError::ZeroFeatures);
        }
        for (&label, vectors) in &self.groups {
            for (position, vector) in vectors.iter().enumerate() {
                if vector.len() != n_features {
                    return Err(RfError::FeatureCountMismatch {
                        expected: n_features,
                        got: vector.len(),
                        label,
                        position,
                    });
                }
                if let Some(feature_index) = vector.iter().position(|v| !v.is_finite()) {
                    return Err(RfError::NonFiniteValue {
                        label,
                        position,
                        feature_index,
                    });
                }
            }
        }
        Ok(n_features)
    }

    /// Rebuild a partition from the vectors at the given flattened positions.
    ///
    /// Vectors are appended in the order the positions are given. Positions
    /// past the end are skipped.
    #[must_use]
    pub fn select(&self, positions: &[usize]) -> LabelPartition {
        // Start offset of every label group in flattened order.
        let mut offsets = Vec::with_capacity(self.groups.len());
        let mut start = 0usize;
        for (&label, vectors) in &self.groups {
            offsets.push((start, label, vectors));
            start += vectors.len();
        }

        let mut selected = LabelPartition::new();
        for &position in positions {
            let group = offsets.partition_point(|&(s, _, _)| s <= position);
            if group == 0 {
                continue;
            }
            let (s, label, vectors) = offsets[group - 1];
            if let Some(v) = vectors.get(position - s) {
                selected.push(label, v.clone());
            }
        }
        selected
    }

    /// Flatten into row-major vectors and labels, in flattened order.
    #[must_use]
    pub fn to_labeled(&self) -> (Vec<FeatureVector>, Vec<usize>) {
        self.flat_iter()
            .map(|(label, v)| (v.clone(), label))
            .unzip()
    }
}

impl FromIterator<(usize, FeatureVector)> for LabelPartition {
    fn from_iter<I: IntoIterator<Item = (usize, FeatureVector)>>(iter: I) -> Self {
        let mut partition = LabelPartition::new();
        for (label, vector) in iter {
            partition.push(label, vector);
        }
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LabelPartition {
        // label 0: 2 vectors, label 2: 1 vector, label 1: 3 vectors
        [
            (0, vec![1.0, 10.0]),
            (2, vec![5.0, 50.0]),
            (1, vec![2.0, 20.0]),
            (0, vec![1.5, 15.0]),
            (1, vec![3.0, 30.0]),
            (1, vec![4.0, 40.0]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn total_count_sums_groups() {
        assert_eq!(sample().total_count(), 6);
        assert_eq!(LabelPartition::new().total_count(), 0);
    }

    #[test]
    fn labels_are_ascending() {
        let labels: Vec<usize> = sample().labels().collect();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn group_order_is_preserved() {
        let p = sample();
        assert_eq!(p.group(0).unwrap(), &[vec![1.0, 10.0], vec![1.5, 15.0]]);
        assert!(p.group(7).is_none());
    }

    #[test]
    fn extend_label_ignores_empty_group() {
        let mut p = LabelPartition::new();
        p.extend_label(3, vec![]);
        assert!(p.is_empty());
        assert_eq!(p.n_labels(), 0);
    }

    #[test]
    fn flat_get_walks_label_groups() {
        let p = sample();
        assert_eq!(p.flat_get(0), Some((0, &vec![1.0, 10.0])));
        assert_eq!(p.flat_get(2), Some((1, &vec![2.0, 20.0])));
        assert_eq!(p.flat_get(5), Some((2, &vec![5.0, 50.0])));
        assert_eq!(p.flat_get(6), None);
    }

    #[test]
    fn select_matches_flat_get() {
        let p = sample();
        let picked = p.select(&[5, 0, 3]);
        assert_eq!(picked.total_count(), 3);
        assert_eq!(picked.group(2).unwrap(), &[vec![5.0, 50.0]]);
        assert_eq!(picked.group(0).unwrap(), &[vec![1.0, 10.0]]);
        assert_eq!(picked.group(1).unwrap(), &[vec![3.0, 30.0]]);
    }

    #[test]
    fn select_skips_out_of_range() {
        let picked = sample().select(&[1, 99]);
        assert_eq!(picked.total_count(), 1);
    }

    #[test]
    fn majority_label_prefers_largest_group() {
        assert_eq!(sample().majority_label(), Some(1));
        assert_eq!(LabelPartition::new().majority_label(), None);
    }

    #[test]
    fn majority_label_tie_goes_to_lowest_label() {
        let p: LabelPartition = [(4, vec![0.0]), (2, vec![0.0]), (4, vec![1.0]), (2, vec![1.0])]
            .into_iter()
            .collect();
        assert_eq!(p.majority_label(), Some(2));
    }

    #[test]
    fn validate_returns_feature_count() {
        assert_eq!(sample().validate().unwrap(), 2);
    }

    #[test]
    fn validate_empty_dataset() {
        let err = LabelPartition::new().validate().unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn validate_zero_features() {
        let p: LabelPartition = [(0, vec![])].into_iter().collect();
        assert!(matches!(p.validate().unwrap_err(), RfError::ZeroFeatures));
    }

    #[test]
    fn validate_ragged_vectors() {
        let p: LabelPartition = [(0, vec![1.0, 2.0]), (1, vec![3.0])].into_iter().collect();
        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            RfError::FeatureCountMismatch {
                expected: 2,
                got: 1,
                label: 1,
                position: 0
            }
        ));
    }

    #[test]
    fn validate_non_finite() {
        let p: LabelPartition = [(0, vec![1.0, f64::NAN])].into_iter().collect();
        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            RfError::NonFiniteValue {
                feature_index: 1,
                ..
            }
        ));
    }

    #[test]
    fn from_labeled_length_mismatch() {
        let err = LabelPartition::from_labeled(&[vec![1.0]], &[0, 1]).unwrap_err();
        assert!(matches!(
            err,
            RfError::LabelCountMismatch {
                n_vectors: 1,
                n_labels: 2
            }
        ));
        assert_eq!(err.to_string(), "1 feature vectors but 2 labels");
    }

    #[test]
    fn to_labeled_flattens_in_label_order() {
        let (features, labels) = sample().to_labeled();
        assert_eq!(labels, vec![0, 0, 1, 1, 1, 2]);
        assert_eq!(features[2], vec![2.0, 20.0]);
    }
}
