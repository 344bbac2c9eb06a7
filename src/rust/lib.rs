//! A thread-safe emotion classifier for short English text, backed by a
//! bag-of-words vectorizer and a logistic-regression model fitted offline.
//!
//! Text goes through a fixed normalization pipeline (lowercasing, punctuation,
//! digit and non-ASCII removal, English stopword filtering), is mapped onto the
//! vectorizer's vocabulary and scored into a probability distribution over six
//! emotions: sadness, joy, love, anger, fear and surprise.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use limbic::Classifier;
//!
//! let classifier = Classifier::builder()
//!     .with_artifacts_dir("artifacts")?
//!     .build()?;
//!
//! let prediction = classifier.predict("I feel so happy and excited today!")?;
//! println!("Predicted emotion: {}", prediction.emotion);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The classifier is thread-safe and can be shared across threads using `Arc`,
//! or through the process-wide instance returned by [`shared_classifier`]:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use limbic::{shared_classifier, RuntimeConfig};
//! use std::thread;
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     handles.push(thread::spawn(|| {
//!         let classifier = shared_classifier(&RuntimeConfig::default()).unwrap();
//!         classifier.predict("what a shock").unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact_manager;
pub mod classifier;
pub mod display;
pub mod evaluation;
mod runtime;

pub use artifact_manager::{
    ArtifactError, ArtifactKind, ArtifactManager, ArtifactPaths, ArtifactStatus, Manifest,
};
pub use classifier::{
    normalize, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, Emotion,
    EmotionMapping, EmotionScore, NormalizationVariant, Normalizer, Prediction,
};
pub use display::{render_prediction, render_report};
pub use evaluation::{evaluate, EvaluationReport};
pub use runtime::{create_classifier, is_initialized, shared_classifier, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
