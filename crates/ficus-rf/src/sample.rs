//! Per-tree data and feature sampling.

use rand::Rng;
use rand::seq::index;

use crate::error::RfError;
use crate::node::FeatureIndex;
use crate::partition::LabelPartition;

/// Draw `sample_size` distinct flattened positions out of `n_available`.
///
/// # Errors
///
/// Returns [`RfError::SampleSizeTooLarge`] when `sample_size > n_available`.
pub fn sample_positions(
    n_available: usize,
    sample_size: usize,
    rng: &mut impl Rng,
) -> Result<Vec<usize>, RfError> {
    if sample_size > n_available {
        return Err(RfError::SampleSizeTooLarge {
            requested: sample_size,
            available: n_available,
        });
    }
    Ok(index::sample(rng, n_available, sample_size).into_vec())
}

/// Draw `sample_size` vectors without replacement and regroup them by label.
///
/// # Errors
///
/// Returns [`RfError::SampleSizeTooLarge`] when `sample_size` exceeds the
/// number of vectors in `data`.
pub fn sample_without_replacement(
    data: &LabelPartition,
    sample_size: usize,
    rng: &mut impl Rng,
) -> Result<LabelPartition, RfError> {
    let positions = sample_positions(data.total_count(), sample_size, rng)?;
    Ok(data.select(&positions))
}

/// Draw `n_selected` distinct feature indices out of `0..n_features`, ascending.
///
/// # Errors
///
/// Returns [`RfError::InvalidMaxFeatures`] when `n_selected` is zero or
/// exceeds `n_features`.
pub fn sample_features(
    n_features: usize,
    n_selected: usize,
    rng: &mut impl Rng,
) -> Result<Vec<FeatureIndex>, RfError> {
    if n_selected == 0 || n_selected > n_features {
        return Err(RfError::InvalidMaxFeatures {
            max_features: n_selected,
            n_features,
        });
    }
    let mut selected = index::sample(rng, n_features, n_selected).into_vec();
    selected.sort_unstable();
    Ok(selected.into_iter().map(FeatureIndex::new).collect())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn dataset(n: usize) -> LabelPartition {
        (0..n).map(|i| (i % 3, vec![i as f64])).collect()
    }

    #[test]
    fn positions_are_distinct_and_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for size in [0, 1, 17, 50] {
            let positions = sample_positions(50, size, &mut rng).unwrap();
            assert_eq!(positions.len(), size);
            let unique: HashSet<usize> = positions.iter().copied().collect();
            assert_eq!(unique.len(), size);
            assert!(positions.iter().all(|&p| p < 50));
        }
    }

    #[test]
    fn oversized_sample_is_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let err = sample_without_replacement(&dataset(5), 6, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            RfError::SampleSizeTooLarge {
                requested: 6,
                available: 5
            }
        ));
    }

    #[test]
    fn sample_keeps_labels_with_vectors() {
        let data = dataset(30);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let sample = sample_without_replacement(&data, 12, &mut rng).unwrap();
        assert_eq!(sample.total_count(), 12);
        // each sampled value is unique and keeps its label
        let mut seen = HashSet::new();
        for (label, v) in sample.flat_iter() {
            let value = v[0] as usize;
            assert_eq!(value % 3, label);
            assert!(seen.insert(value));
        }
    }

    #[test]
    fn full_sample_is_a_permutation() {
        let data = dataset(10);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let sample = sample_without_replacement(&data, 10, &mut rng).unwrap();
        let mut values: Vec<f64> = sample.flat_iter().map(|(_, v)| v[0]).collect();
        values.sort_by(f64::total_cmp);
        let expected: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn features_are_distinct_and_sorted() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let selected = sample_features(16, 5, &mut rng).unwrap();
        assert_eq!(selected.len(), 5);
        assert!(selected.windows(2).all(|w| w[0] < w[1]));
        assert!(selected.iter().all(|f| f.index() < 16));
    }

    #[test]
    fn feature_count_validated() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(sample_features(3, 0, &mut rng).is_err());
        assert!(sample_features(3, 4, &mut rng).is_err());
    }
}
