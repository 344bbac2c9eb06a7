use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classifier::NormalizationVariant;

/// Environment variable overriding the artifact directory.
pub const ARTIFACTS_ENV: &str = "LIMBIC_ARTIFACTS";

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    Missing(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Hash mismatch: expected {expected}, got {actual} for {file}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },
    #[error("Manifest error: {0}")]
    ManifestError(String),
}

/// Reads and deserializes one JSON artifact.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::Missing(path.display().to_string()));
    }
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::ParseError {
        path: path.display().to_string(),
        source,
    })
}

/// The three files a trained classifier is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Vectorizer,
    Mapping,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Model, ArtifactKind::Vectorizer, ArtifactKind::Mapping];

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Model => "logistic_model_bow.json",
            Self::Vectorizer => "bow_vectorizer.json",
            Self::Mapping => "emotion_mapping.json",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("classifier"),
            Self::Vectorizer => f.write_str("vectorizer"),
            Self::Mapping => f.write_str("label mapping"),
        }
    }
}

/// Locations of the three artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub vectorizer: PathBuf,
    pub mapping: PathBuf,
}

impl ArtifactPaths {
    /// Default file names inside `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(ArtifactKind::Model.file_name()),
            vectorizer: dir.join(ArtifactKind::Vectorizer.file_name()),
            mapping: dir.join(ArtifactKind::Mapping.file_name()),
        }
    }

    pub fn get(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Model => &self.model,
            ArtifactKind::Vectorizer => &self.vectorizer,
            ArtifactKind::Mapping => &self.mapping,
        }
    }
}

/// Optional record written next to the artifacts by the training process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Normalization the vectorizer was fitted with
    #[serde(default)]
    pub normalizer: Option<NormalizationVariant>,
    /// File name to lowercase hex SHA-256
    #[serde(default)]
    pub files: BTreeMap<String, String>,
}

/// Existence report for a single artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub exists: bool,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ArtifactManager {
    artifacts_dir: PathBuf,
}

impl ArtifactManager {
    /// Creates a new ArtifactManager over the default artifacts directory
    pub fn new_default() -> Self {
        Self::new(Self::get_default_artifacts_dir())
    }

    /// Returns the default artifacts directory path
    pub fn get_default_artifacts_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(ARTIFACTS_ENV) {
            return PathBuf::from(path);
        }

        // 2. Artifacts shipped next to the working directory
        let local = PathBuf::from("artifacts");
        if local.is_dir() {
            return local;
        }

        // 3. Use platform-specific cache directory
        if let Some(cache_dir) = dirs::cache_dir() {
            return cache_dir.join("limbic").join("artifacts");
        }

        // 4. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".cache").join("limbic").join("artifacts");
        }

        // 5. If all else fails, use system temp directory
        env::temp_dir().join("limbic").join("artifacts")
    }

    pub fn new<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    pub fn get_artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        self.artifacts_dir.join(kind.file_name())
    }

    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.artifacts_dir)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.artifacts_dir.join(MANIFEST_FILE)
    }

    /// Reports existence and size of every artifact.
    pub fn check(&self) -> Vec<ArtifactStatus> {
        ArtifactKind::ALL
            .iter()
            .map(|&kind| {
                let path = self.get_artifact_path(kind);
                let size_bytes = fs::metadata(&path).ok().filter(|m| m.is_file()).map(|m| m.len());
                info!("  {} path: {:?} (exists: {})", kind, path, size_bytes.is_some());
                ArtifactStatus {
                    kind,
                    path,
                    exists: size_bytes.is_some(),
                    size_bytes,
                }
            })
            .collect()
    }

    pub fn missing(&self) -> Vec<ArtifactKind> {
        self.check()
            .into_iter()
            .filter(|status| !status.exists)
            .map(|status| status.kind)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        info!("Checking artifacts in {:?}", self.artifacts_dir);
        self.missing().is_empty()
    }

    /// Loads `manifest.json` if the directory has one.
    pub fn load_manifest(&self) -> Result<Option<Manifest>, ArtifactError> {
        let path = self.manifest_path();
        if !path.exists() {
            debug!("No manifest at {:?}", path);
            return Ok(None);
        }
        read_json(&path).map(Some)
    }

    pub fn verify_file(&self, path: &Path, expected_hash: &str) -> Result<bool, ArtifactError> {
        info!("Verifying file: {:?}", path);
        let hash = sha256_file(path)?;
        debug!("Calculated hash: {}", hash);
        debug!("Expected hash:   {}", expected_hash);
        Ok(hash.eq_ignore_ascii_case(expected_hash))
    }

    /// Checks every artifact against the manifest hashes.
    ///
    /// # Errors
    /// - `ManifestError` if there is no manifest or it omits an artifact
    /// - `Missing` if an artifact file does not exist
    /// - `HashMismatch` for the first file whose content differs
    pub fn verify(&self) -> Result<Manifest, ArtifactError> {
        let manifest = self
            .load_manifest()?
            .ok_or_else(|| ArtifactError::ManifestError(format!("No manifest found at {:?}", self.manifest_path())))?;

        for kind in ArtifactKind::ALL {
            let name = kind.file_name();
            let expected = manifest
                .files
                .get(name)
                .ok_or_else(|| ArtifactError::ManifestError(format!("Manifest does not list {}", name)))?;
            let path = self.get_artifact_path(kind);
            if !path.exists() {
                return Err(ArtifactError::Missing(path.display().to_string()));
            }
            let actual = sha256_file(&path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                error!("{} hash mismatch: expected {}, got {}", name, expected, actual);
                return Err(ArtifactError::HashMismatch {
                    file: name.to_string(),
                    expected: expected.clone(),
                    actual,
                });
            }
        }

        info!("All artifacts match the manifest");
        Ok(manifest)
    }
}

/// Lowercase hex SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String, ArtifactError> {
    let bytes = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(manager: &ArtifactManager, normalizer: Option<NormalizationVariant>) -> Manifest {
        let files = ArtifactKind::ALL
            .iter()
            .map(|kind| {
                let hash = sha256_file(&manager.get_artifact_path(*kind)).unwrap();
                (kind.file_name().to_string(), hash)
            })
            .collect();
        let manifest = Manifest { normalizer, files };
        fs::write(manager.manifest_path(), serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
        manifest
    }

    fn write_all(dir: &Path) {
        for kind in ArtifactKind::ALL {
            fs::write(dir.join(kind.file_name()), format!("{{\"kind\": \"{}\"}}", kind)).unwrap();
        }
    }

    #[test]
    fn test_check_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArtifactManager::new(dir.path());
        assert_eq!(manager.missing().len(), 3);
        assert!(!manager.is_complete());

        fs::write(manager.get_artifact_path(ArtifactKind::Model), "{}").unwrap();
        let missing = manager.missing();
        assert_eq!(missing, vec![ArtifactKind::Vectorizer, ArtifactKind::Mapping]);

        let status = &manager.check()[0];
        assert!(status.exists);
        assert_eq!(status.size_bytes, Some(2));
    }

    #[test]
    fn test_manifest_round_trip_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ArtifactManager::new(dir.path());
        write_all(dir.path());

        assert!(manager.load_manifest().unwrap().is_none());
        assert!(matches!(manager.verify(), Err(ArtifactError::ManifestError(_))));

        let written = write_manifest(&manager, Some(NormalizationVariant::Compact));
        assert_eq!(written.files.len(), 3);
        let loaded = manager.verify().unwrap();
        assert_eq!(loaded, written);
        assert_eq!(loaded.normalizer, Some(NormalizationVariant::Compact));

        fs::write(manager.get_artifact_path(ArtifactKind::Mapping), "{\"0\": \"joy\"}").unwrap();
        match manager.verify() {
            Err(ArtifactError::HashMismatch { file, .. }) => assert_eq!(file, "emotion_mapping.json"),
            other => panic!("expected hash mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_read_json_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        assert!(matches!(
            read_json::<Manifest>(&path),
            Err(ArtifactError::Missing(_))
        ));

        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            read_json::<Manifest>(&path),
            Err(ArtifactError::ParseError { .. })
        ));
    }

    #[test]
    fn test_sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, "abc").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        let manager = ArtifactManager::new(dir.path());
        assert!(manager
            .verify_file(&path, "BA7816BF8F01CFEA414140DE5DAE2223B00361A396177A9CB410FF61F20015AD")
            .unwrap());
    }

    #[test]
    fn test_default_artifacts_dir() {
        env::set_var(ARTIFACTS_ENV, "/tmp/test-limbic");
        let path = ArtifactManager::get_default_artifacts_dir();
        assert_eq!(path, PathBuf::from("/tmp/test-limbic"));
        env::remove_var(ARTIFACTS_ENV);

        let path = ArtifactManager::get_default_artifacts_dir();
        assert!(path.ends_with("artifacts"));
    }
}
