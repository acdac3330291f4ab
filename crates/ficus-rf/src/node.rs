use std::fmt;

use crate::error::RfError;
use crate::partition::LabelPartition;

/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Create a new feature index from a zero-based column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into a `Vec<Node>` arena, identifying a specific node in a decision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Create a new node index from a zero-based arena position.
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gini impurity value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Impurity(f64);

impl Impurity {
    /// Create a new impurity value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw impurity value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return `true` if the node holds a single label.
    #[must_use]
    pub fn is_pure(self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// The question asked at an interior node: "is `x[feature] <= threshold`?"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitQuestion {
    /// Feature the question looks at.
    pub feature: FeatureIndex,
    /// Decision value.
    pub threshold: f64,
}

impl SplitQuestion {
    /// Create a new question.
    #[must_use]
    pub fn new(feature: FeatureIndex, threshold: f64) -> Self {
        Self { feature, threshold }
    }

    /// Return `true` if inference routes `sample` to the left child.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::FeatureOutOfRange`] when `sample` has no value for `feature`.
    pub fn routes_left(&self, sample: &[f64]) -> Result<bool, RfError> {
        let value = sample
            .get(self.feature.index())
            .ok_or(RfError::FeatureOutOfRange {
                feature: self.feature.index(),
                n_features: sample.len(),
            })?;
        Ok(*value <= self.threshold)
    }
}

impl fmt::Display for SplitQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x[{}] <= {:.2}", self.feature, self.threshold)
    }
}

/// A node in a decision tree arena.
///
/// Every node keeps the partition of training vectors that reached it.
/// Children are owned through arena indices; `parent` is a plain back
/// reference used for upward traversal only.
#[derive(Debug, Clone)]
pub enum Node {
    /// An interior split node. Always has exactly two children.
    Split {
        /// Question routing vectors to the children.
        question: SplitQuestion,
        /// Index of the left child node.
        left: NodeIndex,
        /// Index of the right child node.
        right: NodeIndex,
        /// Index of the parent node, `None` at the root.
        parent: Option<NodeIndex>,
        /// Training vectors that reached this node.
        partition: LabelPartition,
        /// Impurity at this node before splitting.
        impurity: Impurity,
        /// Information gain of the chosen split.
        gain: f64,
    },
    /// A terminal leaf node.
    Leaf {
        /// Majority label of `partition`.
        prediction: usize,
        /// Index of the parent node, `None` at the root.
        parent: Option<NodeIndex>,
        /// Training vectors that reached this leaf.
        partition: LabelPartition,
        /// Impurity at this leaf.
        impurity: Impurity,
    },
}

impl Node {
    /// Return the impurity at this node (before splitting for interior nodes).
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity, .. } | Node::Leaf { impurity, .. } => *impurity,
        }
    }

    /// Return the training vectors that reached this node.
    #[must_use]
    pub fn partition(&self) -> &LabelPartition {
        match self {
            Node::Split { partition, .. } | Node::Leaf { partition, .. } => partition,
        }
    }

    /// Return the number of training vectors that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.partition().total_count()
    }

    /// Return the parent index, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeIndex> {
        match self {
            Node::Split { parent, .. } | Node::Leaf { parent, .. } => *parent,
        }
    }

    /// Return the split question of an interior node.
    #[must_use]
    pub fn question(&self) -> Option<&SplitQuestion> {
        match self {
            Node::Split { question, .. } => Some(question),
            Node::Leaf { .. } => None,
        }
    }

    /// Return the `(left, right)` children of an interior node.
    #[must_use]
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        match self {
            Node::Split { left, right, .. } => Some((*left, *right)),
            Node::Leaf { .. } => None,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- FeatureIndex ---

    #[test]
    fn feature_index_display() {
        let fi = FeatureIndex::new(3);
        assert_eq!(format!("{fi}"), "3");
    }

    #[test]
    fn feature_index_ordering() {
        assert!(FeatureIndex::new(1) < FeatureIndex::new(5));
    }

    // --- Impurity ---

    #[test]
    fn impurity_display() {
        let imp = Impurity::new(0.333333);
        assert_eq!(format!("{imp}"), "0.333333");
    }

    #[test]
    fn impurity_pure() {
        assert!(Impurity::new(0.0).is_pure());
        assert!(!Impurity::new(0.5).is_pure());
    }

    // --- SplitQuestion ---

    #[test]
    fn question_routes_ties_left() {
        let q = SplitQuestion::new(FeatureIndex::new(1), 2.5);
        assert!(q.routes_left(&[100.0, 2.5]).unwrap());
        assert!(q.routes_left(&[100.0, -1.0]).unwrap());
        assert!(!q.routes_left(&[0.0, 2.6]).unwrap());
    }

    #[test]
    fn question_on_short_sample_is_error() {
        let q = SplitQuestion::new(FeatureIndex::new(3), 0.0);
        assert!(matches!(
            q.routes_left(&[1.0, 2.0]).unwrap_err(),
            RfError::FeatureOutOfRange {
                feature: 3,
                n_features: 2
            }
        ));
    }

    #[test]
    fn question_display() {
        let q = SplitQuestion::new(FeatureIndex::new(4), 1.23456);
        assert_eq!(format!("{q}"), "x[4] <= 1.23");
    }

    // --- Node ---

    fn make_partition() -> LabelPartition {
        [(0, vec![1.0]), (1, vec![2.0]), (1, vec![3.0])]
            .into_iter()
            .collect()
    }

    fn make_leaf() -> Node {
        Node::Leaf {
            prediction: 1,
            parent: Some(NodeIndex::new(0)),
            partition: make_partition(),
            impurity: Impurity::new(0.444),
        }
    }

    fn make_split() -> Node {
        Node::Split {
            question: SplitQuestion::new(FeatureIndex::new(0), 1.5),
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            parent: None,
            partition: make_partition(),
            impurity: Impurity::new(0.444),
            gain: 0.444,
        }
    }

    #[test]
    fn leaf_accessors() {
        let leaf = make_leaf();
        assert!(leaf.is_leaf());
        assert!(leaf.question().is_none());
        assert!(leaf.children().is_none());
        assert_eq!(leaf.parent(), Some(NodeIndex::new(0)));
        assert_eq!(leaf.n_samples(), 3);
    }

    #[test]
    fn split_accessors() {
        let split = make_split();
        assert!(!split.is_leaf());
        assert_eq!(split.question().unwrap().feature.index(), 0);
        assert_eq!(split.children(), Some((NodeIndex::new(1), NodeIndex::new(2))));
        assert_eq!(split.parent(), None);
        assert!((split.impurity().value() - 0.444).abs() < f64::EPSILON);
    }
}
