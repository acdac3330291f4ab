//! Random Forest classification: train, evaluate, predict.
//!
//! Trees are grown from label-grouped data ([`LabelPartition`]) by drawing a
//! handful of random `feature < threshold` candidates per node and keeping the
//! one with the highest Gini information gain. A forest trains each tree on a
//! sample drawn without replacement and a random feature subset, then
//! classifies by majority vote. Batch inference runs in parallel via rayon.

mod config;
mod confusion;
mod error;
mod forest;
mod node;
mod oob;
mod partition;
mod predict;
mod result;
mod sample;
mod score;
mod split;
mod tree;

pub use config::{MaxFeatures, OobMode, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::RfError;
pub use forest::RandomForest;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex, SplitQuestion};
pub use oob::OobScore;
pub use partition::{FeatureVector, LabelPartition};
pub use predict::majority_vote;
pub use result::{RandomForestResult, TrainingMetadata};
pub use sample::{sample_features, sample_positions, sample_without_replacement};
pub use score::score;
pub use split::{
    BestSplit, CandidateSplit, find_best_split, generate_candidate_split, impurity,
    information_gain,
};
pub use tree::{DecisionTree, DecisionTreeConfig};
