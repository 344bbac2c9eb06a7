use env_logger::{Builder, Env};
use limbic::{Classifier, ClassifierError, Emotion};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

fn init() {
    let _ = Builder::from_env(Env::default().default_filter_or("warn")).try_init();
}

fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join("artifacts")
}

fn setup_test_classifier() -> Classifier {
    init();
    Classifier::builder()
        .with_artifacts_dir(demo_dir())
        .unwrap()
        .build()
        .expect("Failed to create classifier")
}

#[test]
fn test_end_to_end_classification() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();

    let cases = [
        ("I feel so happy and excited today!", Emotion::Joy),
        ("I am really angry about this situation", Emotion::Anger),
        ("I love spending time with my family", Emotion::Love),
        ("This is a shocking and surprising news", Emotion::Surprise),
        ("I am terrified of what might happen", Emotion::Fear),
        ("I feel so sad and lonely", Emotion::Sadness),
    ];
    for (text, expected) in cases {
        let prediction = classifier.predict(text)?;
        assert_eq!(prediction.emotion, expected, "text: {}", text);
        assert!(prediction.confidence > 0.5, "text: {}", text);
    }
    Ok(())
}

#[test]
fn test_probabilities_form_a_distribution() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = setup_test_classifier();
    for text in ["I feel so sad and lonely", "The book is on the table.", "", "😀😀😀"] {
        let prediction = classifier.predict(text)?;
        assert_eq!(prediction.probabilities.len(), 6);
        assert!(prediction
            .probabilities
            .iter()
            .all(|s| (0.0..=1.0).contains(&s.probability)));
        let total: f64 = prediction.probabilities.iter().map(|s| s.probability).sum();
        assert!((total - 1.0).abs() < 1e-6, "sum was {}", total);
        assert_eq!(prediction.probability_of(prediction.emotion), Some(prediction.confidence));
    }
    Ok(())
}

#[test]
fn test_empty_input_returns_prior() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let empty = classifier.predict("")?;
    let filtered = classifier.predict("the and of 123 !!!")?;

    assert!(empty.normalized_text.is_empty());
    assert!(filtered.normalized_text.is_empty());
    assert_eq!(empty.emotion, Emotion::Joy);
    assert_eq!(empty.probabilities, filtered.probabilities);
    Ok(())
}

#[test]
fn test_repeated_calls_are_identical() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let text = "I'm happy but also worried about the future.";
    let first = classifier.predict(text)?;
    for _ in 0..10 {
        assert_eq!(classifier.predict(text)?, first);
    }
    Ok(())
}

#[test]
fn test_normalized_text_is_exposed() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let prediction = classifier.predict("I LOVE this!!! 123 😀")?;
    assert_eq!(prediction.normalized_text, "love");
    assert_eq!(prediction.emotion, Emotion::Love);
    Ok(())
}

#[test]
fn test_batch_matches_single_predictions() -> Result<(), ClassifierError> {
    let classifier = setup_test_classifier();
    let texts = ["I feel so sad and lonely", "What a stunning revelation!", "I adore you"];
    let batch = classifier.predict_batch(&texts)?;
    assert_eq!(batch.len(), texts.len());
    for (text, prediction) in texts.iter().zip(batch) {
        assert_eq!(classifier.predict(text)?, prediction);
    }
    Ok(())
}

#[test]
fn test_classifier_info() {
    let classifier = setup_test_classifier();
    let info = classifier.info();
    assert_eq!(info.num_classes, 6);
    assert_eq!(info.labels, Emotion::ALL.to_vec());
    assert_eq!(info.vocabulary_size, 164);
    assert!(info.paths.is_some());
}

#[test]
fn test_thread_safety() -> Result<(), Box<dyn std::error::Error>> {
    let classifier = Arc::new(setup_test_classifier());
    let expected = classifier.predict("I am terrified of what might happen")?;

    let mut handles = vec![];
    for _ in 0..4 {
        let classifier = Arc::clone(&classifier);
        let expected = expected.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                let prediction = classifier
                    .predict("I am terrified of what might happen")
                    .unwrap();
                assert_eq!(prediction, expected);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    Ok(())
}
