use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use log::info;

use crate::artifact_manager::ArtifactManager;
use crate::classifier::{Classifier, ClassifierError, NormalizationVariant};

static SHARED: OnceLock<Classifier> = OnceLock::new();
static INIT: Mutex<()> = Mutex::new(());

#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Directory holding the artifacts; `None` resolves the default location
    pub artifacts_dir: Option<PathBuf>,
    /// Normalization override; `None` follows the manifest
    pub normalization: Option<NormalizationVariant>,
    /// Check artifact hashes against the manifest before loading
    pub verify_hashes: bool,
}

impl RuntimeConfig {
    pub fn with_artifacts_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn resolved_artifacts_dir(&self) -> PathBuf {
        self.artifacts_dir
            .clone()
            .unwrap_or_else(ArtifactManager::get_default_artifacts_dir)
    }
}

/// Loads a fresh classifier according to `config`.
pub fn create_classifier(config: &RuntimeConfig) -> Result<Classifier, ClassifierError> {
    let dir = config.resolved_artifacts_dir();
    info!("Loading artifacts from {:?}", dir);

    let mut builder = Classifier::builder().with_hash_verification(config.verify_hashes);
    if let Some(variant) = config.normalization {
        builder = builder.with_normalization(variant);
    }
    builder.with_artifacts_dir(&dir)?.build()
}

/// Returns the process-wide classifier, loading it on first use.
///
/// Initialization happens at most once. A failed load leaves nothing behind,
/// so a later call retries it. Once loaded, `config` is ignored.
pub fn shared_classifier(config: &RuntimeConfig) -> Result<&'static Classifier, ClassifierError> {
    if let Some(classifier) = SHARED.get() {
        return Ok(classifier);
    }

    let _guard = INIT.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(classifier) = SHARED.get() {
        return Ok(classifier);
    }

    let classifier = create_classifier(config)?;
    Ok(SHARED.get_or_init(|| classifier))
}

pub fn is_initialized() -> bool {
    SHARED.get().is_some()
}
