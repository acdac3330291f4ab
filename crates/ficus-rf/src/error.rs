/// Errors from Random Forest training, inference, and scoring.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when the per-tree sample size is zero.
    #[error("sample_size must be at least 1, got {sample_size}")]
    InvalidSampleSize {
        /// The invalid sample_size value provided.
        sample_size: usize,
    },

    /// Returned when the number of candidate splits per node is zero.
    #[error("n_candidates must be at least 1, got {n_candidates}")]
    InvalidCandidateCount {
        /// The invalid n_candidates value provided.
        n_candidates: usize,
    },

    /// Returned when max_features resolves to 0 or exceeds n_features.
    #[error("max_features resolved to {max_features}, but must be in [1, {n_features}]")]
    InvalidMaxFeatures {
        /// The resolved max_features value.
        max_features: usize,
        /// The number of features in the dataset.
        n_features: usize,
    },

    /// Returned when the training dataset has zero samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training dataset has zero feature columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when impurity is requested for a partition holding no vectors.
    #[error("impurity is undefined for an empty partition")]
    EmptyPartition,

    /// Returned when more samples are requested than the dataset holds.
    #[error("cannot draw {requested} samples without replacement from {available}")]
    SampleSizeTooLarge {
        /// The number of samples requested.
        requested: usize,
        /// The number of vectors available in the dataset.
        available: usize,
    },

    /// Returned when a split search is given an empty feature subset.
    #[error("split search needs at least one allowed feature")]
    NoAllowedFeatures,

    /// Returned when an allowed feature index is outside the vector length.
    #[error("feature index {feature} is out of range for {n_features} features")]
    FeatureOutOfRange {
        /// The offending feature index.
        feature: usize,
        /// The number of features per vector.
        n_features: usize,
    },

    /// Returned when a training vector has a different length than the first one.
    #[error("vector {position} of label {label} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the vector.
        got: usize,
        /// The label whose group holds the vector.
        label: usize,
        /// The zero-based position of the vector within its label group.
        position: usize,
    },

    /// Returned when a query vector has a different length at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value in vector {position} of label {label}, feature {feature_index}")]
    NonFiniteValue {
        /// The label whose group holds the vector.
        label: usize,
        /// The zero-based position of the vector within its label group.
        position: usize,
        /// The zero-based index of the offending feature column.
        feature_index: usize,
    },

    /// Returned when row-major vectors and their labels differ in count.
    #[error("{n_vectors} feature vectors but {n_labels} labels")]
    LabelCountMismatch {
        /// Number of feature vectors supplied.
        n_vectors: usize,
        /// Number of labels supplied.
        n_labels: usize,
    },

    /// Returned when predicted and true label sequences differ in length.
    #[error("{predicted} predicted labels but {truth} true labels")]
    LengthMismatch {
        /// Length of the predicted label sequence.
        predicted: usize,
        /// Length of the true label sequence.
        truth: usize,
    },

    /// Returned when scoring an empty prediction sequence.
    #[error("cannot score an empty prediction sequence")]
    EmptyPredictions,

    /// Returned when a vote or label does not fit the label tally.
    #[error("label {label} does not fit a tally of {n_labels} labels")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// The size of the tally.
        n_labels: usize,
    },

    /// Returned when a forest is assembled from zero trees.
    #[error("a forest needs at least one tree")]
    EmptyForest,

    /// Returned when OOB evaluation fails (no sample has any OOB tree).
    #[error("OOB evaluation failed: {reason}")]
    OobEvaluationFailed {
        /// Human-readable description of why OOB evaluation failed.
        reason: String,
    },
}
