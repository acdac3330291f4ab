//! Configuration builder for Random Forest training.

use crate::error::RfError;
use crate::partition::LabelPartition;
use crate::result::RandomForestResult;

/// Strategy for determining how many features each tree may split on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n)) + 1`, clamped to `n`.
    SqrtPlusOne,
    /// `ceil(sqrt(n))`.
    Sqrt,
    /// `ceil(log2(n))`, at least 1.
    Log2,
    /// A fixed count.
    Fixed(usize),
    /// All features (no subsampling).
    All,
}

impl MaxFeatures {
    /// Resolve the strategy to a concrete count for `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] when the count is outside `[1, n_features]`.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let n = n_features as f64;
        let resolved = match self {
            MaxFeatures::SqrtPlusOne => (n.sqrt().floor() as usize + 1).min(n_features),
            MaxFeatures::Sqrt => n.sqrt().ceil() as usize,
            MaxFeatures::Log2 => n.log2().ceil().max(1.0) as usize,
            MaxFeatures::Fixed(k) => k,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// Whether to compute out-of-bag evaluation during training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OobMode {
    /// Compute OOB accuracy and confusion matrix.
    Enabled,
    /// Skip OOB evaluation.
    Disabled,
}

/// Configuration for Random Forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default       |
/// |----------------|---------------|
/// | `n_candidates` | 10            |
/// | `max_depth`    | 5             |
/// | `max_features` | `SqrtPlusOne` |
/// | `seed`         | 42            |
/// | `oob_mode`     | `Disabled`    |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) sample_size: usize,
    pub(crate) n_candidates: usize,
    pub(crate) max_depth: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) seed: u64,
    pub(crate) oob_mode: OobMode,
}

impl RandomForestConfig {
    /// Create a new config for `n_trees` trees, each trained on
    /// `sample_size` vectors drawn without replacement.
    ///
    /// # Errors
    ///
    /// | Variant                        | When                   |
    /// |--------------------------------|------------------------|
    /// | [`RfError::InvalidTreeCount`]  | `n_trees` is zero      |
    /// | [`RfError::InvalidSampleSize`] | `sample_size` is zero  |
    pub fn new(n_trees: usize, sample_size: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        if sample_size == 0 {
            return Err(RfError::InvalidSampleSize { sample_size });
        }
        Ok(Self {
            n_trees,
            sample_size,
            n_candidates: 10,
            max_depth: 5,
            max_features: MaxFeatures::SqrtPlusOne,
            seed: 42,
            oob_mode: OobMode::Disabled,
        })
    }

    // --- Setters ---

    /// Set how many random candidate splits are drawn at each node.
    #[must_use]
    pub fn with_n_candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = n_candidates;
        self
    }

    /// Set the per-tree depth budget.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the per-tree feature subset strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the OOB evaluation mode.
    #[must_use]
    pub fn with_oob_mode(mut self, oob_mode: OobMode) -> Self {
        self.oob_mode = oob_mode;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the number of vectors sampled per tree.
    #[must_use]
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Return the number of candidate splits per node.
    #[must_use]
    pub fn n_candidates(&self) -> usize {
        self.n_candidates
    }

    /// Return the per-tree depth budget.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the feature subset strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return the OOB evaluation mode.
    #[must_use]
    pub fn oob_mode(&self) -> OobMode {
        self.oob_mode
    }

    /// Train a Random Forest on a label-grouped dataset.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                              |
    /// |--------------------------------------|---------------------------------------------------|
    /// | [`RfError::EmptyDataset`]            | `data` is empty                                   |
    /// | [`RfError::ZeroFeatures`]            | vectors have zero feature columns                 |
    /// | [`RfError::FeatureCountMismatch`]    | vectors have inconsistent lengths                 |
    /// | [`RfError::NonFiniteValue`]          | any value is NaN or infinite                      |
    /// | [`RfError::SampleSizeTooLarge`]      | `sample_size` exceeds the number of vectors       |
    /// | [`RfError::InvalidCandidateCount`]   | `n_candidates` is zero                            |
    /// | [`RfError::InvalidMaxFeatures`]      | resolved max_features is outside [1, n_features]  |
    /// | [`RfError::OobEvaluationFailed`]     | OOB enabled but no vector is out-of-bag           |
    pub fn fit(&self, data: &LabelPartition) -> Result<RandomForestResult, RfError> {
        crate::forest::train(self, data)
    }
}
