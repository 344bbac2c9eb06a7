use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::error::ClassifierError;
use super::labels::Emotion;
use super::model::{argmax, LogisticModel};
use super::normalizer::Normalizer;
use super::vectorizer::{CountVectorizer, FeatureVector};
use crate::artifact_manager::ArtifactPaths;

/// Probability assigned to one emotion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionScore {
    pub emotion: Emotion,
    pub probability: f64,
}

/// The outcome of classifying one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// The most likely emotion
    pub emotion: Emotion,
    /// Probability of `emotion`, in `[0, 1]`
    pub confidence: f64,
    /// Every label's probability in class-index order; sums to one.
    pub probabilities: Vec<EmotionScore>,
    /// The text after normalization, as seen by the vectorizer
    pub normalized_text: String,
}

impl Prediction {
    pub fn label(&self) -> &'static str {
        self.emotion.as_str()
    }

    /// Confidence expressed as a percentage.
    pub fn confidence_pct(&self) -> f64 {
        self.confidence * 100.0
    }

    pub fn probability_of(&self, emotion: Emotion) -> Option<f64> {
        self.probabilities
            .iter()
            .find(|s| s.emotion == emotion)
            .map(|s| s.probability)
    }

    /// Scores sorted by probability, highest first. Equal probabilities keep
    /// class-index order.
    pub fn ranked(&self) -> Vec<EmotionScore> {
        let mut ranked = self.probabilities.clone();
        ranked.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }

    pub fn top(&self, n: usize) -> Vec<EmotionScore> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// A thread-safe emotion classifier over a bag-of-words logistic-regression model.
///
/// # Thread Safety
///
/// This type is automatically `Send + Sync`: the loaded artifacts are immutable
/// and shared through `Arc`, so any number of threads may call
/// [`Classifier::predict`] at once.
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use limbic::Classifier;
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(Classifier::builder()
///     .with_artifacts_dir("artifacts")?
///     .build()?);
///
/// let classifier_clone = Arc::clone(&classifier);
/// thread::spawn(move || {
///     classifier_clone.predict("what a lovely day").unwrap();
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    pub(crate) paths: Option<ArtifactPaths>,
    pub(crate) normalizer: Normalizer,
    pub(crate) vectorizer: Arc<CountVectorizer>,
    pub(crate) model: Arc<LogisticModel>,
    /// Emotion for each coefficient row of `model`
    pub(crate) labels: Arc<Vec<Emotion>>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            paths: self.paths.clone(),
            normalization: self.normalizer.variant(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
            num_classes: self.labels.len(),
            labels: self.labels.as_ref().clone(),
        }
    }

    pub fn labels(&self) -> &[Emotion] {
        &self.labels
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Applies the normalization the artifacts were fitted with.
    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Normalizes `text` and maps it onto the vectorizer's vocabulary.
    pub fn vectorize(&self, text: &str) -> FeatureVector {
        self.vectorizer.transform(&self.normalize(text))
    }

    /// Predicts the emotion of the input text.
    ///
    /// Empty or fully filtered input is not an error: it maps to an all-zero
    /// feature vector and the model's intercept-only distribution.
    ///
    /// # Returns
    /// A [`Prediction`] holding the arg-max emotion, its probability and the
    /// full distribution over every label.
    ///
    /// # Errors
    /// - `PredictionError` if the model cannot score the features or produces
    ///   a non-finite distribution
    ///
    /// # Example
    /// ```no_run
    /// # use limbic::Classifier;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// # let classifier = Classifier::builder().with_artifacts_dir("artifacts")?.build()?;
    /// let prediction = classifier.predict("I feel so happy today!")?;
    /// println!("{} ({:.1}%)", prediction.emotion, prediction.confidence_pct());
    /// for score in prediction.ranked() {
    ///     println!("{}: {:.3}", score.emotion, score.probability);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn predict(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let normalized_text = self.normalize(text);
        let features = self.vectorizer.transform(&normalized_text);
        debug!(
            "Normalized {:?} -> {:?} ({} known terms)",
            text,
            normalized_text,
            features.nnz()
        );

        let proba = self.model.predict_proba(&features)?;
        if proba.len() != self.labels.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Model returned {} probabilities for {} labels",
                proba.len(),
                self.labels.len()
            )));
        }

        let best = argmax(&proba);
        let probabilities = self
            .labels
            .iter()
            .zip(proba.iter())
            .map(|(&emotion, &probability)| EmotionScore { emotion, probability })
            .collect();

        Ok(Prediction {
            emotion: self.labels[best],
            confidence: proba[best],
            probabilities,
            normalized_text,
        })
    }

    /// Predicts every text independently, preserving input order.
    pub fn predict_batch<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Prediction>, ClassifierError> {
        texts.iter().map(|t| self.predict(t.as_ref())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::labels::EmotionMapping;
    use crate::classifier::model::{ModelArtifact, MultiClass};
    use crate::classifier::vectorizer::VectorizerArtifact;

    fn tiny_classifier() -> Classifier {
        let terms = ["sad", "happy", "love", "angry", "scared", "shocked"];
        let coef = (0..6)
            .map(|row| (0..6).map(|col| if row == col { 3.0 } else { -0.5 }).collect())
            .collect();
        Classifier::builder()
            .with_components(
                VectorizerArtifact::from_terms(terms),
                ModelArtifact {
                    classes: (0..6).collect(),
                    coef,
                    intercept: vec![0.2, 0.4, -0.3, 0.0, -0.1, -0.6],
                    multi_class: MultiClass::Multinomial,
                },
                EmotionMapping::standard(),
            )
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_predicts_matching_emotion() {
        let classifier = tiny_classifier();
        let prediction = classifier.predict("I am SO angry!!!").unwrap();
        assert_eq!(prediction.emotion, Emotion::Anger);
        assert_eq!(prediction.label(), "anger");
        assert_eq!(prediction.normalized_text, "angry");
        assert_eq!(prediction.probability_of(Emotion::Anger), Some(prediction.confidence));
    }

    #[test]
    fn test_empty_input_uses_prior() {
        let classifier = tiny_classifier();
        let prediction = classifier.predict("").unwrap();
        assert_eq!(prediction.emotion, Emotion::Joy);
        assert!(prediction.normalized_text.is_empty());
        let total: f64 = prediction.probabilities.iter().map(|s| s.probability).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ranked_and_top() {
        let classifier = tiny_classifier();
        let prediction = classifier.predict("happy but scared").unwrap();
        let ranked = prediction.ranked();
        assert_eq!(ranked.len(), 6);
        assert!(ranked.windows(2).all(|w| w[0].probability >= w[1].probability));
        assert_eq!(ranked[0].emotion, prediction.emotion);
        assert_eq!(prediction.top(2).len(), 2);
        assert!((prediction.confidence_pct() - prediction.confidence * 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_batch_preserves_order() {
        let classifier = tiny_classifier();
        let predictions = classifier.predict_batch(&["so sad", "in love", "shocked"]).unwrap();
        let emotions: Vec<_> = predictions.iter().map(|p| p.emotion).collect();
        assert_eq!(emotions, vec![Emotion::Sadness, Emotion::Love, Emotion::Surprise]);
    }

    #[test]
    fn test_info() {
        let info = tiny_classifier().info();
        assert_eq!(info.vocabulary_size, 6);
        assert_eq!(info.num_classes, 6);
        assert!(info.paths.is_none());
        assert_eq!(info.labels[4], Emotion::Fear);
    }
}
