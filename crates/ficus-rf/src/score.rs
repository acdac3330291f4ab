//! Classification accuracy.

use crate::error::RfError;

/// Fraction of positions where `predicted` equals `truth`.
///
/// # Errors
///
/// | Variant                       | When                        |
/// |-------------------------------|-----------------------------|
/// | [`RfError::LengthMismatch`]   | the slices differ in length |
/// | [`RfError::EmptyPredictions`] | both slices are empty       |
pub fn score(predicted: &[usize], truth: &[usize]) -> Result<f64, RfError> {
    if predicted.len() != truth.len() {
        return Err(RfError::LengthMismatch {
            predicted: predicted.len(),
            truth: truth.len(),
        });
    }
    if predicted.is_empty() {
        return Err(RfError::EmptyPredictions);
    }
    let correct = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    Ok(correct as f64 / predicted.len() as f64)
}
