//! Built-in sentence battery for checking a set of artifacts end to end.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Serialize;

use crate::classifier::{Classifier, ClassifierError, Emotion, EmotionScore};

/// Ten unambiguous sentences per emotion.
pub const EMOTION_SENTENCES: [(Emotion, [&str; 10]); 6] = [
    (
        Emotion::Joy,
        [
            "I feel absolutely wonderful and excited about this amazing opportunity!",
            "This is the best day of my life, I'm so happy!",
            "I'm thrilled to celebrate this incredible achievement with everyone!",
            "What a fantastic surprise, I'm overjoyed!",
            "I feel like I'm on top of the world right now!",
            "This brings me so much happiness and delight!",
            "I'm bursting with joy and enthusiasm!",
            "Life is beautiful and I feel amazing today!",
            "I'm so grateful and blessed, this makes me incredibly happy!",
            "I can't stop smiling, this is absolutely wonderful!",
        ],
    ),
    (
        Emotion::Sadness,
        [
            "I feel so lonely and heartbroken right now.",
            "This devastating news has left me completely shattered.",
            "I'm overwhelmed with grief and sorrow.",
            "I feel empty and hopeless about everything.",
            "The loss has left me feeling deeply sad and lost.",
            "I'm crying because I feel so disappointed and hurt.",
            "This melancholy feeling won't go away.",
            "I feel abandoned and forgotten by everyone.",
            "The pain in my heart is unbearable.",
            "I'm drowning in sadness and despair.",
        ],
    ),
    (
        Emotion::Anger,
        [
            "I'm absolutely furious about this unfair treatment!",
            "This makes me so angry and frustrated!",
            "I'm outraged by this completely unacceptable behavior!",
            "I'm livid and can't believe how badly this was handled!",
            "This injustice makes my blood boil!",
            "I'm fed up with these constant problems and delays!",
            "I'm enraged by their disrespectful attitude!",
            "This situation is infuriating and completely wrong!",
            "I'm burning with anger over this betrayal!",
            "I'm absolutely mad about these ridiculous rules!",
        ],
    ),
    (
        Emotion::Fear,
        [
            "I'm terrified of what might happen next.",
            "This situation fills me with dread and anxiety.",
            "I'm scared and worried about the future.",
            "I feel paralyzed by fear and uncertainty.",
            "This gives me chills and makes me very nervous.",
            "I'm frightened by the thought of failure.",
            "I'm trembling with fear about this dangerous situation.",
            "I'm panicking and don't know what to do.",
            "This nightmare scenario keeps me awake at night.",
            "I'm petrified and can't stop worrying about it.",
        ],
    ),
    (
        Emotion::Surprise,
        [
            "I can't believe this incredible news, what a shock!",
            "This unexpected turn of events has left me speechless!",
            "I'm amazed and completely caught off guard!",
            "What a stunning revelation, I never saw this coming!",
            "This is so surprising, I'm absolutely astonished!",
            "I'm flabbergasted by this sudden development!",
            "This twist has left me in complete disbelief!",
            "I'm shocked and amazed by this incredible discovery!",
            "This came out of nowhere, what a surprise!",
            "I'm stunned by this unexpected announcement!",
        ],
    ),
    (
        Emotion::Love,
        [
            "I love spending quality time with my family and friends.",
            "My heart is full of love and affection for you.",
            "I cherish every moment we share together.",
            "I'm deeply in love and feel so connected to you.",
            "I adore everything about this beautiful relationship.",
            "My love for you grows stronger every single day.",
            "I feel so much warmth and love in my heart.",
            "I'm passionate about the people I care about most.",
            "This fills my heart with pure love and joy.",
            "I'm devoted to you and treasure our bond together.",
        ],
    ),
];

/// Sentences carrying more than one emotion; there is no single right answer.
pub const MIXED_SENTENCES: [&str; 10] = [
    "I'm happy but also worried about the future.",
    "This news is shocking but also makes me sad.",
    "I love you but I'm angry about what happened.",
    "I'm excited but also scared about this opportunity.",
    "I feel grateful yet heartbroken at the same time.",
    "This is surprising and disappointing simultaneously.",
    "I'm joyful yet anxious about tomorrow.",
    "I feel loved but also lonely sometimes.",
    "This makes me angry but I understand why it happened.",
    "I'm sad but hopeful things will get better.",
];

/// Sentences with no emotional content.
pub const NEUTRAL_SENTENCES: [&str; 10] = [
    "The weather is nice today.",
    "I went to the store to buy groceries.",
    "The meeting is scheduled for 3 PM.",
    "Please send me the report by Friday.",
    "The book is on the table.",
    "I need to finish this project soon.",
    "The train arrives at 9:30 AM.",
    "She works in the marketing department.",
    "The conference room is available now.",
    "I'll call you back later this evening.",
];

/// Returns the labelled sentences for one emotion.
pub fn sentences_for(emotion: Emotion) -> &'static [&'static str] {
    EMOTION_SENTENCES
        .iter()
        .find(|(e, _)| *e == emotion)
        .map(|(_, sentences)| sentences.as_slice())
        .unwrap_or(&[])
}

/// Every sentence in the battery: labelled, then mixed, then neutral.
pub fn all_sentences() -> impl Iterator<Item = &'static str> {
    EMOTION_SENTENCES
        .iter()
        .flat_map(|(_, sentences)| sentences.iter().copied())
        .chain(MIXED_SENTENCES.iter().copied())
        .chain(NEUTRAL_SENTENCES.iter().copied())
}

/// A labelled sentence the classifier got wrong.
#[derive(Debug, Clone, Serialize)]
pub struct Miss {
    pub sentence: &'static str,
    pub expected: Emotion,
    pub predicted: Emotion,
    pub confidence: f64,
    /// Two most likely labels
    pub top: Vec<EmotionScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryResult {
    pub emotion: Emotion,
    pub correct: usize,
    pub total: usize,
    pub misses: Vec<Miss>,
}

impl CategoryResult {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MixedResult {
    pub sentence: &'static str,
    /// Three most likely labels
    pub top: Vec<EmotionScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub categories: Vec<CategoryResult>,
    pub mixed: Vec<MixedResult>,
    /// How often each label won on the neutral sentences
    pub neutral: BTreeMap<Emotion, usize>,
}

impl EvaluationReport {
    pub fn correct(&self) -> usize {
        self.categories.iter().map(|c| c.correct).sum()
    }

    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.total).sum()
    }

    /// Fraction of all labelled sentences classified correctly.
    pub fn overall_accuracy(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct() as f64 / total as f64,
        }
    }

    /// Mean of the per-emotion accuracies.
    pub fn average_category_accuracy(&self) -> f64 {
        if self.categories.is_empty() {
            return 0.0;
        }
        self.categories.iter().map(CategoryResult::accuracy).sum::<f64>()
            / self.categories.len() as f64
    }

    pub fn neutral_total(&self) -> usize {
        self.neutral.values().sum()
    }
}

/// Runs the whole battery through `classifier`.
///
/// Emotions the classifier cannot predict are skipped from the labelled part.
pub fn evaluate(classifier: &Classifier) -> Result<EvaluationReport, ClassifierError> {
    let mut categories = Vec::new();
    for (emotion, sentences) in EMOTION_SENTENCES.iter() {
        if !classifier.labels().contains(emotion) {
            debug!("Skipping {} sentences, label not in model", emotion);
            continue;
        }

        let mut result = CategoryResult {
            emotion: *emotion,
            correct: 0,
            total: sentences.len(),
            misses: Vec::new(),
        };
        for sentence in sentences.iter().copied() {
            let prediction = classifier.predict(sentence)?;
            if prediction.emotion == *emotion {
                result.correct += 1;
            } else {
                result.misses.push(Miss {
                    sentence,
                    expected: *emotion,
                    predicted: prediction.emotion,
                    confidence: prediction.confidence,
                    top: prediction.top(2),
                });
            }
        }
        info!(
            "{}: {}/{} correct",
            emotion, result.correct, result.total
        );
        categories.push(result);
    }

    let mixed = MIXED_SENTENCES
        .iter()
        .map(|&sentence| {
            Ok(MixedResult {
                sentence,
                top: classifier.predict(sentence)?.top(3),
            })
        })
        .collect::<Result<Vec<_>, ClassifierError>>()?;

    let mut neutral: BTreeMap<Emotion, usize> =
        classifier.labels().iter().map(|e| (*e, 0)).collect();
    for sentence in NEUTRAL_SENTENCES {
        *neutral.entry(classifier.predict(sentence)?.emotion).or_insert(0) += 1;
    }

    Ok(EvaluationReport {
        categories,
        mixed,
        neutral,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn demo_classifier() -> Classifier {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join("artifacts");
        Classifier::builder()
            .with_artifacts_dir(dir)
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_battery_sizes() {
        for emotion in Emotion::ALL {
            assert_eq!(sentences_for(emotion).len(), 10);
        }
        assert_eq!(all_sentences().count(), 80);
    }

    #[test]
    fn test_demo_bundle_report() {
        let report = evaluate(&demo_classifier()).unwrap();
        assert_eq!(report.categories.len(), 6);
        assert_eq!(report.total(), 60);
        assert_eq!(report.correct(), 60);
        assert!((report.overall_accuracy() - 1.0).abs() < 1e-12);
        assert!((report.average_category_accuracy() - 1.0).abs() < 1e-12);
        assert!(report.mixed.iter().all(|m| m.top.len() == 3));
        assert_eq!(report.neutral_total(), 10);
        assert_eq!(report.neutral.len(), 6);
    }

    #[test]
    fn test_empty_report_accuracy() {
        let report = EvaluationReport {
            categories: Vec::new(),
            mixed: Vec::new(),
            neutral: BTreeMap::new(),
        };
        assert_eq!(report.overall_accuracy(), 0.0);
        assert_eq!(report.average_category_accuracy(), 0.0);
    }
}
