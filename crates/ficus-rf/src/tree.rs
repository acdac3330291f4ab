use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

use crate::{
    RfError,
    node::{FeatureIndex, Impurity, Node, NodeIndex},
    partition::LabelPartition,
    split::{BestSplit, CandidateSplit, find_best_split, impurity},
};

/// Configuration for a single randomized decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default |
/// |----------------|---------|
/// | `n_candidates` | 10      |
/// | `max_depth`    | 5       |
/// | `seed`         | 42      |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) n_candidates: usize,
    pub(crate) max_depth: usize,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_candidates: 10,
            max_depth: 5,
            seed: 42,
        }
    }

    /// Set how many random candidate splits are drawn at each node.
    #[must_use]
    pub fn with_n_candidates(mut self, n_candidates: usize) -> Self {
        self.n_candidates = n_candidates;
        self
    }

    /// Set the depth budget. `0` makes the root a leaf.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the random seed used by [`fit`](Self::fit).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of candidate splits per node.
    #[must_use]
    pub fn n_candidates(&self) -> usize {
        self.n_candidates
    }

    /// Return the depth budget.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a tree on `data` using every feature and the configured seed.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    #[instrument(skip(self, data), fields(n_samples = data.total_count()))]
    pub fn fit(&self, data: &LabelPartition) -> Result<DecisionTree, RfError> {
        let n_features = data.validate()?;
        let features = (0..n_features).map(FeatureIndex::new).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.build(data.clone(), features, &mut rng)
    }

    /// Grow a tree on `data`, splitting only on `features`.
    ///
    /// A node becomes a leaf when it is pure, when the depth budget is
    /// spent, or when the best of `n_candidates` random splits has no
    /// positive gain. Otherwise it gets the winning question and exactly two
    /// children, each grown with one less unit of depth budget.
    ///
    /// # Errors
    ///
    /// | Variant                            | When                                          |
    /// |------------------------------------|-----------------------------------------------|
    /// | [`RfError::EmptyDataset`]          | `data` is empty                               |
    /// | [`RfError::ZeroFeatures`]          | vectors have zero feature columns             |
    /// | [`RfError::FeatureCountMismatch`]  | vectors have inconsistent lengths             |
    /// | [`RfError::NonFiniteValue`]        | any value is NaN or infinite                  |
    /// | [`RfError::InvalidCandidateCount`] | `n_candidates` is zero                        |
    /// | [`RfError::NoAllowedFeatures`]     | `features` is empty                           |
    /// | [`RfError::FeatureOutOfRange`]     | a feature index is past the vector length     |
    pub fn build(
        &self,
        data: LabelPartition,
        features: Vec<FeatureIndex>,
        rng: &mut impl Rng,
    ) -> Result<DecisionTree, RfError> {
        let n_features = data.validate()?;

        if self.n_candidates == 0 {
            return Err(RfError::InvalidCandidateCount {
                n_candidates: self.n_candidates,
            });
        }
        if features.is_empty() {
            return Err(RfError::NoAllowedFeatures);
        }
        if let Some(f) = features.iter().find(|f| f.index() >= n_features) {
            return Err(RfError::FeatureOutOfRange {
                feature: f.index(),
                n_features,
            });
        }

        let mut builder = TreeBuilder {
            n_candidates: self.n_candidates,
            features: &features,
            rng,
            arena: Vec::new(),
        };
        builder.grow(data, None, self.max_depth)?;
        let nodes = builder.arena;

        debug!(n_nodes = nodes.len(), "decision tree built");

        Ok(DecisionTree {
            nodes,
            features,
            n_features,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
enum LeafReason {
    Pure,
    DepthExhausted,
    NoGain,
}

/// Recursive induction state for one tree.
struct TreeBuilder<'a, R> {
    n_candidates: usize,
    features: &'a [FeatureIndex],
    rng: &'a mut R,
    arena: Vec<Node>,
}

impl<R: Rng> TreeBuilder<'_, R> {
    /// Grow the subtree for `partition` and return the index of its root.
    fn grow(
        &mut self,
        partition: LabelPartition,
        parent: Option<NodeIndex>,
        depth_budget: usize,
    ) -> Result<NodeIndex, RfError> {
        let impurity = impurity(&partition)?;

        if impurity.is_pure() {
            return self.leaf(partition, parent, impurity, LeafReason::Pure);
        }
        if depth_budget == 0 {
            return self.leaf(partition, parent, impurity, LeafReason::DepthExhausted);
        }

        let BestSplit { gain, split, .. } =
            find_best_split(&partition, self.n_candidates, self.features, &mut *self.rng)?;
        if gain <= 0.0 {
            return self.leaf(partition, parent, impurity, LeafReason::NoGain);
        }
        let CandidateSplit {
            left,
            right,
            question,
        } = split;

        // Arena pattern: reserve index, recurse, then overwrite with the split.
        let idx = NodeIndex::new(self.arena.len());
        self.arena.push(Node::Leaf {
            prediction: 0,
            parent,
            partition: LabelPartition::new(),
            impurity,
        });

        let left = self.grow(left, Some(idx), depth_budget - 1)?;
        let right = self.grow(right, Some(idx), depth_budget - 1)?;

        self.arena[idx.index()] = Node::Split {
            question,
            left,
            right,
            parent,
            partition,
            impurity,
            gain,
        };
        Ok(idx)
    }

    fn leaf(
        &mut self,
        partition: LabelPartition,
        parent: Option<NodeIndex>,
        impurity: Impurity,
        reason: LeafReason,
    ) -> Result<NodeIndex, RfError> {
        let prediction = partition.majority_label().ok_or(RfError::EmptyPartition)?;
        let idx = NodeIndex::new(self.arena.len());
        trace!(
            node = idx.index(),
            ?reason,
            prediction,
            n_samples = partition.total_count(),
            "leaf"
        );
        self.arena.push(Node::Leaf {
            prediction,
            parent,
            partition,
            impurity,
        });
        Ok(idx)
    }
}

/// A fitted decision tree.
///
/// Stored as an arena-based `Vec<Node>`; the root is at index 0. Immutable
/// once built.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) features: Vec<FeatureIndex>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Predict the label of a single sample.
    ///
    /// Routes left when `sample[feature] <= threshold`, right otherwise, and
    /// returns the majority label of the leaf reached.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn classify(&self, sample: &[f64]) -> Result<usize, RfError> {
        match self.leaf_for(sample)? {
            Node::Leaf { prediction, .. } => Ok(*prediction),
            Node::Split { .. } => unreachable!("traverse always ends at a leaf"),
        }
    }

    /// Return the leaf a sample is routed to.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn leaf_for(&self, sample: &[f64]) -> Result<&Node, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(&self.nodes[self.traverse(sample)?])
    }

    /// Return the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Return the node at `idx`, if it exists.
    #[must_use]
    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.index())
    }

    /// Return the parent of the node at `idx`.
    #[must_use]
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.node(idx).and_then(Node::parent)
    }

    /// Return the feature subset this tree was allowed to split on.
    #[must_use]
    pub fn features(&self) -> &[FeatureIndex] {
        &self.features
    }

    /// Return the number of features a sample must have.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the height of the tree. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node_idx, d)) = stack.pop() {
            match &self.nodes[node_idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }

    /// Traverse the tree from the root and return the arena index of the leaf.
    fn traverse(&self, sample: &[f64]) -> Result<usize, RfError> {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return Ok(idx),
                Node::Split {
                    question,
                    left,
                    right,
                    ..
                } => {
                    idx = if question.routes_left(sample)? {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}

/// Pre-order rendering, one node per line, children under `|-->` markers.
impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node_idx, depth)) = stack.pop() {
            if depth > 0 {
                write!(f, "{}|--> ", "    ".repeat(depth - 1))?;
            }
            match &self.nodes[node_idx] {
                Node::Split {
                    question,
                    left,
                    right,
                    ..
                } => {
                    writeln!(f, "{question}")?;
                    stack.push((right.index(), depth + 1));
                    stack.push((left.index(), depth + 1));
                }
                Node::Leaf {
                    prediction,
                    partition,
                    ..
                } => {
                    writeln!(
                        f,
                        "leaf: label {prediction} ({} samples)",
                        partition.total_count()
                    )?;
                }
            }
        }
        Ok(())
    }
}
