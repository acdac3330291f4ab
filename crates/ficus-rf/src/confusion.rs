//! Confusion matrix and per-label precision, recall and F1.

use std::fmt;

use crate::error::RfError;

/// Counts of (truth, predicted) label pairs.
///
/// Stored row-major: `count(t, p)` is the number of samples with true label
/// `t` that were classified as `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: Vec<usize>,
    n_labels: usize,
}

/// Precision, recall, F1 and support of one label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub label: usize,
    /// `tp / (tp + fp)`, or 0 when the label was never predicted.
    pub precision: f64,
    /// `tp / support`, or 0 when the label never occurs in the truth.
    pub recall: f64,
    pub f1: f64,
    /// Number of samples whose true label is `label`.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Tally `predicted` against `truth`, position by position.
    ///
    /// # Errors
    ///
    /// | Variant                      | When                                  |
    /// |------------------------------|---------------------------------------|
    /// | [`RfError::LengthMismatch`]  | the slices differ in length           |
    /// | [`RfError::EmptyPredictions`]| both slices are empty                 |
    /// | [`RfError::LabelOutOfRange`] | any label is `>= n_labels`            |
    pub fn from_labels(
        truth: &[usize],
        predicted: &[usize],
        n_labels: usize,
    ) -> Result<Self, RfError> {
        if truth.len() != predicted.len() {
            return Err(RfError::LengthMismatch {
                predicted: predicted.len(),
                truth: truth.len(),
            });
        }
        if truth.is_empty() {
            return Err(RfError::EmptyPredictions);
        }
        let mut matrix = Self::zeros(n_labels);
        for (&t, &p) in truth.iter().zip(predicted) {
            matrix.record(t, p)?;
        }
        Ok(matrix)
    }

    pub(crate) fn zeros(n_labels: usize) -> Self {
        Self {
            counts: vec![0; n_labels * n_labels],
            n_labels,
        }
    }

    pub(crate) fn record(&mut self, truth: usize, predicted: usize) -> Result<(), RfError> {
        let n_labels = self.n_labels;
        for label in [truth, predicted] {
            if label >= n_labels {
                return Err(RfError::LabelOutOfRange { label, n_labels });
            }
        }
        self.counts[truth * n_labels + predicted] += 1;
        Ok(())
    }

    /// Number of samples with true label `truth` classified as `predicted`.
    ///
    /// Out-of-range labels count as zero.
    #[must_use]
    pub fn count(&self, truth: usize, predicted: usize) -> usize {
        if truth >= self.n_labels || predicted >= self.n_labels {
            return 0;
        }
        self.counts[truth * self.n_labels + predicted]
    }

    /// Total number of tallied samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Fraction of samples on the diagonal, 0 for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_labels).map(|l| self.count(l, l)).sum();
        correct as f64 / total as f64
    }

    /// Precision, recall, F1 and support for every label in `0..n_labels`.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_labels)
            .map(|label| {
                let tp = self.count(label, label);
                let support: usize = self.row(label).iter().sum();
                let predicted: usize = (0..self.n_labels).map(|t| self.count(t, label)).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// The counts for true label `truth`, indexed by predicted label.
    ///
    /// # Panics
    ///
    /// Panics if `truth >= n_labels`.
    #[must_use]
    pub fn row(&self, truth: usize) -> &[usize] {
        &self.counts[truth * self.n_labels..(truth + 1) * self.n_labels]
    }

    /// Copy the matrix out as one `Vec` per true label.
    #[must_use]
    pub fn as_rows(&self) -> Vec<Vec<usize>> {
        if self.n_labels == 0 {
            return Vec::new();
        }
        self.counts
            .chunks(self.n_labels)
            .map(<[usize]>::to_vec)
            .collect()
    }

    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "truth\\pred")?;
        for p in 0..self.n_labels {
            write!(f, " {p:>6}")?;
        }
        writeln!(f)?;
        for t in 0..self.n_labels {
            write!(f, "{t:>10}")?;
            for count in self.row(t) {
                write!(f, " {count:>6}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
