mod error;
mod normalizer;
mod vectorizer;
mod model;
mod labels;
#[allow(clippy::module_inception)]
mod classifier;
pub mod builder;

pub use error::ClassifierError;
pub use normalizer::{
    normalize, NormalizationVariant, Normalizer, COMPACT_STOPWORDS, ENGLISH_STOPWORDS, PUNCTUATION,
};
pub use vectorizer::{CountVectorizer, FeatureVector, VectorizerArtifact, DEFAULT_TOKEN_PATTERN};
pub use model::{LogisticModel, ModelArtifact, MultiClass};
pub use labels::{Emotion, EmotionMapping};
pub use classifier::{Classifier, EmotionScore, Prediction};
pub use builder::ClassifierBuilder;

use crate::artifact_manager::ArtifactPaths;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Where the artifacts were read from; `None` when built in memory
    pub paths: Option<ArtifactPaths>,
    /// Normalization applied before vectorizing
    pub normalization: NormalizationVariant,
    /// Number of terms in the vectorizer vocabulary
    pub vocabulary_size: usize,
    /// Number of classes the model predicts
    pub num_classes: usize,
    /// Emotion for each class, in class-index order
    pub labels: Vec<Emotion>,
}
