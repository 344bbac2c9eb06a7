use limbic::{Classifier, ClassifierError};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join("artifacts")
}

/// Writes a three-term bundle, letting each test override one file.
fn write_bundle(
    vectorizer: serde_json::Value,
    model: serde_json::Value,
    mapping: serde_json::Value,
) -> Result<TempDir, Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("bow_vectorizer.json"), vectorizer.to_string())?;
    fs::write(dir.path().join("logistic_model_bow.json"), model.to_string())?;
    fs::write(dir.path().join("emotion_mapping.json"), mapping.to_string())?;
    Ok(dir)
}

fn vectorizer() -> serde_json::Value {
    json!({ "vocabulary": { "gloomy": 0, "cheerful": 1, "furious": 2 } })
}

fn model() -> serde_json::Value {
    json!({
        "classes": [0, 1, 3],
        "coef": [[2.0, -1.0, -1.0], [-1.0, 2.0, -1.0], [-1.0, -1.0, 2.0]],
        "intercept": [0.0, 0.1, -0.1]
    })
}

fn mapping() -> serde_json::Value {
    json!({ "0": "sadness", "1": "joy", "3": "anger" })
}

fn load(dir: &TempDir) -> Result<Classifier, ClassifierError> {
    Classifier::builder().with_artifacts_dir(dir.path())?.build()
}

#[test]
fn test_minimal_bundle_loads() -> Result<(), Box<dyn std::error::Error>> {
    let dir = write_bundle(vectorizer(), model(), mapping())?;
    let classifier = load(&dir)?;
    assert_eq!(classifier.info().num_classes, 3);

    let prediction = classifier.predict("So furious!")?;
    assert_eq!(prediction.label(), "anger");
    assert_eq!(prediction.probabilities.len(), 3);
    Ok(())
}

#[test]
fn test_malformed_json() -> Result<(), Box<dyn std::error::Error>> {
    let dir = write_bundle(vectorizer(), model(), mapping())?;
    fs::write(dir.path().join("logistic_model_bow.json"), "{ not json")?;
    assert!(matches!(load(&dir), Err(ClassifierError::LoadError(_))));
    Ok(())
}

#[test]
fn test_feature_count_mismatch() -> Result<(), Box<dyn std::error::Error>> {
    let dir = write_bundle(
        json!({ "vocabulary": { "gloomy": 0, "cheerful": 1 } }),
        model(),
        mapping(),
    )?;
    assert!(matches!(load(&dir), Err(ClassifierError::BuildError(_))));
    Ok(())
}

#[test]
fn test_ragged_coefficients() -> Result<(), Box<dyn std::error::Error>> {
    let ragged = json!({
        "classes": [0, 1],
        "coef": [[1.0, 0.0, 0.0], [1.0, 0.0]],
        "intercept": [0.0, 0.0]
    });
    let dir = write_bundle(vectorizer(), ragged, mapping())?;
    assert!(matches!(load(&dir), Err(ClassifierError::LoadError(_))));
    Ok(())
}

#[test]
fn test_unknown_emotion_in_mapping() -> Result<(), Box<dyn std::error::Error>> {
    let dir = write_bundle(
        vectorizer(),
        model(),
        json!({ "0": "sadness", "1": "joy", "3": "boredom" }),
    )?;
    assert!(matches!(load(&dir), Err(ClassifierError::LoadError(_))));
    Ok(())
}

#[test]
fn test_class_missing_from_mapping() -> Result<(), Box<dyn std::error::Error>> {
    let dir = write_bundle(vectorizer(), model(), json!({ "0": "sadness", "1": "joy" }))?;
    assert!(matches!(load(&dir), Err(ClassifierError::BuildError(_))));
    Ok(())
}

#[test]
fn test_vocabulary_with_gap() -> Result<(), Box<dyn std::error::Error>> {
    let dir = write_bundle(
        json!({ "vocabulary": { "gloomy": 0, "cheerful": 1, "furious": 5 } }),
        model(),
        mapping(),
    )?;
    assert!(matches!(load(&dir), Err(ClassifierError::LoadError(_))));
    Ok(())
}

#[test]
fn test_single_class_model_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let single = json!({ "classes": [1], "coef": [[1.0, 1.0, 1.0]], "intercept": [0.0] });
    let dir = write_bundle(vectorizer(), single, mapping())?;
    assert!(matches!(load(&dir), Err(ClassifierError::LoadError(_))));
    Ok(())
}

#[test]
fn test_one_vs_rest_model() -> Result<(), Box<dyn std::error::Error>> {
    let mut ovr = model();
    ovr["multi_class"] = json!("ovr");
    let dir = write_bundle(vectorizer(), ovr, mapping())?;
    let prediction = load(&dir)?.predict("gloomy")?;

    assert_eq!(prediction.label(), "sadness");
    let total: f64 = prediction.probabilities.iter().map(|s| s.probability).sum();
    assert!((total - 1.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_builder_consumed_on_failure() -> Result<(), Box<dyn std::error::Error>> {
    // A failed load leaves nothing to predict with; a fresh builder succeeds.
    let dir = tempfile::tempdir()?;
    assert!(Classifier::builder().with_artifacts_dir(dir.path()).is_err());
    assert!(Classifier::builder().with_artifacts_dir(demo_dir())?.build().is_ok());
    Ok(())
}
