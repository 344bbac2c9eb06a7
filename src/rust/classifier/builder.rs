use std::path::Path;
use std::sync::Arc;

use log::{error, info, warn};

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::labels::{Emotion, EmotionMapping};
use super::model::{LogisticModel, ModelArtifact};
use super::normalizer::{NormalizationVariant, Normalizer};
use super::vectorizer::{CountVectorizer, VectorizerArtifact};
use crate::artifact_manager::{ArtifactManager, ArtifactPaths};

/// A builder for constructing a Classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    paths: Option<ArtifactPaths>,
    vectorizer: Option<CountVectorizer>,
    model: Option<LogisticModel>,
    mapping: Option<EmotionMapping>,
    normalization: Option<NormalizationVariant>,
    manifest_normalization: Option<NormalizationVariant>,
    /// Directory the artifacts came from, when loaded with `with_artifacts_dir`
    manager: Option<ArtifactManager>,
    verify_hashes: bool,
    verified: bool,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use limbic::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the normalization variant the artifacts were fitted with.
    ///
    /// When left unset, the variant recorded in the artifact manifest is used,
    /// falling back to [`NormalizationVariant::Full`]. Setting a variant that
    /// contradicts the manifest makes [`ClassifierBuilder::build`] fail.
    pub fn with_normalization(mut self, variant: NormalizationVariant) -> Self {
        self.normalization = Some(variant);
        self
    }

    /// Requires every artifact to match the SHA-256 recorded in the manifest.
    ///
    /// Set before loading, the check runs before anything is parsed. Set after
    /// loading, it runs in [`ClassifierBuilder::build`]. Only artifacts loaded
    /// with [`ClassifierBuilder::with_artifacts_dir`] have a manifest to check.
    pub fn with_hash_verification(mut self, enabled: bool) -> Self {
        self.verify_hashes = enabled;
        self
    }

    /// Loads the three artifacts from a directory using their default file names
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - Artifacts were already loaded
    ///   - Any of the three files is missing (reported together, before anything is parsed)
    ///   - Hash verification is enabled and the manifest is absent or does not match
    ///   - Any artifact cannot be deserialized or is internally inconsistent
    ///
    /// # Example
    /// ```no_run
    /// use limbic::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new()
    ///     .with_artifacts_dir("artifacts");
    /// ```
    pub fn with_artifacts_dir<P: AsRef<Path>>(mut self, dir: P) -> Result<Self, ClassifierError> {
        self.ensure_unset()?;

        let manager = ArtifactManager::new(dir.as_ref());
        let missing = manager.missing();
        if !missing.is_empty() {
            let names: Vec<String> = missing
                .iter()
                .map(|kind| manager.get_artifact_path(*kind).display().to_string())
                .collect();
            error!("Missing artifact files: {}", names.join(", "));
            return Err(ClassifierError::LoadError(format!(
                "Missing artifact files: {}",
                names.join(", ")
            )));
        }

        let manifest = if self.verify_hashes {
            let manifest = manager.verify()?;
            self.verified = true;
            Some(manifest)
        } else {
            manager.load_manifest()?
        };
        self.manifest_normalization = manifest.and_then(|m| m.normalizer);

        let paths = manager.paths();
        self.manager = Some(manager);
        self.load_paths(paths)
    }

    /// Loads artifacts from explicit file paths
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - Any path is empty
    ///   - Artifacts were already loaded
    ///   - Any file does not exist or cannot be deserialized
    pub fn with_custom_artifacts(
        self,
        model_path: &str,
        vectorizer_path: &str,
        mapping_path: &str,
    ) -> Result<Self, ClassifierError> {
        if model_path.is_empty() || vectorizer_path.is_empty() || mapping_path.is_empty() {
            return Err(ClassifierError::ValidationError("Artifact paths cannot be empty".to_string()));
        }
        self.ensure_unset()?;

        for path in [model_path, vectorizer_path, mapping_path] {
            if !Path::new(path).exists() {
                return Err(ClassifierError::LoadError(format!("Artifact file not found: {}", path)));
            }
        }

        self.load_paths(ArtifactPaths {
            model: model_path.into(),
            vectorizer: vectorizer_path.into(),
            mapping: mapping_path.into(),
        })
    }

    /// Uses artifacts already held in memory
    pub fn with_components(
        mut self,
        vectorizer: VectorizerArtifact,
        model: ModelArtifact,
        mapping: EmotionMapping,
    ) -> Result<Self, ClassifierError> {
        self.ensure_unset()?;
        self.vectorizer = Some(CountVectorizer::from_artifact(vectorizer)?);
        self.model = Some(LogisticModel::from_artifact(model)?);
        self.mapping = Some(mapping);
        Ok(self)
    }

    fn ensure_unset(&self) -> Result<(), ClassifierError> {
        if self.vectorizer.is_some() || self.model.is_some() || self.mapping.is_some() {
            return Err(ClassifierError::BuildError("Artifacts already set".to_string()));
        }
        Ok(())
    }

    fn load_paths(mut self, paths: ArtifactPaths) -> Result<Self, ClassifierError> {
        let vectorizer = CountVectorizer::from_file(&paths.vectorizer).map_err(|e| {
            error!("Failed to load vectorizer: {}", e);
            e
        })?;
        info!("Vectorizer loaded ({} terms)", vectorizer.vocabulary_size());

        let model = LogisticModel::from_file(&paths.model).map_err(|e| {
            error!("Failed to load classifier: {}", e);
            e
        })?;
        info!(
            "Classifier loaded ({} classes x {} features)",
            model.n_classes(),
            model.n_features()
        );

        let mapping = EmotionMapping::from_file(&paths.mapping).map_err(|e| {
            error!("Failed to load label mapping: {}", e);
            e
        })?;
        info!("Label mapping loaded ({} labels)", mapping.len());

        self.paths = Some(paths);
        self.vectorizer = Some(vectorizer);
        self.model = Some(model);
        self.mapping = Some(mapping);
        Ok(self)
    }

    /// Resolves the emotion of every model class, failing if the vectorizer,
    /// model and mapping disagree.
    fn validate_artifacts(
        vectorizer: &CountVectorizer,
        model: &LogisticModel,
        mapping: &EmotionMapping,
    ) -> Result<Vec<Emotion>, ClassifierError> {
        if model.n_features() != vectorizer.vocabulary_size() {
            return Err(ClassifierError::BuildError(format!(
                "Model expects {} features but the vectorizer vocabulary has {} terms",
                model.n_features(),
                vectorizer.vocabulary_size()
            )));
        }

        let mut labels = Vec::with_capacity(model.n_classes());
        for &class in model.classes() {
            let emotion = mapping.get(class).ok_or_else(|| {
                ClassifierError::BuildError(format!("Class {} has no entry in the label mapping", class))
            })?;
            if labels.contains(&emotion) {
                return Err(ClassifierError::BuildError(format!(
                    "Emotion '{}' is assigned to more than one model class",
                    emotion
                )));
            }
            labels.push(emotion);
        }

        if mapping.len() > labels.len() {
            warn!(
                "Label mapping has {} entries but the model only predicts {} classes",
                mapping.len(),
                labels.len()
            );
        }
        Ok(labels)
    }

    /// Runs a hash check requested after the artifacts were loaded.
    fn verify_late(&self) -> Result<(), ClassifierError> {
        if !self.verify_hashes || self.verified {
            return Ok(());
        }
        match &self.manager {
            Some(manager) => {
                manager.verify()?;
                Ok(())
            }
            None if self.vectorizer.is_some() => Err(ClassifierError::BuildError(
                "Hash verification requires artifacts loaded from a directory with a manifest".to_string(),
            )),
            None => Ok(()),
        }
    }

    fn resolve_normalization(&self) -> Result<NormalizationVariant, ClassifierError> {
        match (self.normalization, self.manifest_normalization) {
            (Some(explicit), Some(recorded)) if explicit != recorded => Err(ClassifierError::BuildError(format!(
                "Normalization '{}' was requested but the artifacts were fitted with '{}'",
                explicit, recorded
            ))),
            (Some(explicit), _) => Ok(explicit),
            (None, Some(recorded)) => Ok(recorded),
            (None, None) => Ok(NormalizationVariant::default()),
        }
    }

    /// Builds and returns the final Classifier instance
    ///
    /// # Returns
    /// * `Result<Classifier, ClassifierError>` - The constructed Classifier if successful, or an error if:
    ///   - No artifacts have been loaded
    ///   - The model's feature count differs from the vocabulary size
    ///   - A model class is missing from the label mapping
    ///   - The requested normalization contradicts the manifest
    ///   - Hash verification was enabled after loading and the files do not
    ///     match the manifest, or there is no manifest to check
    ///
    /// # Example
    /// ```no_run
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use limbic::{ClassifierBuilder, NormalizationVariant};
    ///
    /// let classifier = ClassifierBuilder::new()
    ///     .with_artifacts_dir("artifacts")?
    ///     .with_normalization(NormalizationVariant::Full)
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        self.verify_late()?;
        let normalization = self.resolve_normalization()?;

        let (vectorizer, model, mapping) = match (self.vectorizer, self.model, self.mapping) {
            (Some(v), Some(m), Some(l)) => (v, m, l),
            _ => return Err(ClassifierError::BuildError("Artifacts must be loaded before building".to_string())),
        };

        let labels = Self::validate_artifacts(&vectorizer, &model, &mapping)?;
        info!(
            "Classifier ready: {} labels, {} terms, '{}' normalization",
            labels.len(),
            vectorizer.vocabulary_size(),
            normalization
        );

        Ok(Classifier {
            paths: self.paths,
            normalizer: Normalizer::new(normalization),
            vectorizer: Arc::new(vectorizer),
            model: Arc::new(model),
            labels: Arc::new(labels),
        })
    }
}
