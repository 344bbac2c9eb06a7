use std::fmt;

use crate::artifact_manager::ArtifactError;

/// Represents the different types of errors that can occur in the emotion classifier.
#[derive(Debug)]
pub enum ClassifierError {
    /// One of the artifacts is missing, unreadable or cannot be deserialized
    LoadError(String),
    /// The loaded artifacts are inconsistent with each other or with the configuration
    BuildError(String),
    /// Error occurred while vectorizing or scoring an input
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    ValidationError(String),
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadError(msg) => write!(f, "Artifact load error: {}", msg),
            Self::BuildError(msg) => write!(f, "Build error: {}", msg),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<ArtifactError> for ClassifierError {
    fn from(err: ArtifactError) -> Self {
        ClassifierError::LoadError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_errors_become_load_errors() {
        let err: ClassifierError = ArtifactError::Missing("bow_vectorizer.json".into()).into();
        assert!(matches!(err, ClassifierError::LoadError(_)));
        assert!(err.to_string().starts_with("Artifact load error:"));
        assert!(err.to_string().contains("bow_vectorizer.json"));
    }
}
