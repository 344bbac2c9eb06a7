use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use crate::artifact_manager::read_json;

/// The closed set of emotions a classifier can predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Sadness,
    Joy,
    Love,
    Anger,
    Fear,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Sadness,
        Emotion::Joy,
        Emotion::Love,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sadness => "sadness",
            Self::Joy => "joy",
            Self::Love => "love",
            Self::Anger => "anger",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
        }
    }

    /// Display form with a leading capital, e.g. `Surprise`.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Sadness => "Sadness",
            Self::Joy => "Joy",
            Self::Love => "Love",
            Self::Anger => "Anger",
            Self::Fear => "Fear",
            Self::Surprise => "Surprise",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| ClassifierError::ValidationError(format!("Unknown emotion '{}'", s)))
    }
}

/// Class index to emotion, as written by the training process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmotionMapping {
    labels: BTreeMap<usize, Emotion>,
}

impl EmotionMapping {
    /// Parses raw names, rejecting anything outside the six known emotions or
    /// any emotion mapped twice.
    pub fn from_names(names: BTreeMap<usize, String>) -> Result<Self, ClassifierError> {
        if names.is_empty() {
            return Err(ClassifierError::LoadError("Emotion mapping is empty".into()));
        }

        let mut labels = BTreeMap::new();
        for (index, name) in names {
            let emotion: Emotion = name.parse().map_err(|_| {
                ClassifierError::LoadError(format!(
                    "Emotion mapping entry {} names unknown emotion '{}'",
                    index, name
                ))
            })?;
            if labels.values().any(|e| *e == emotion) {
                return Err(ClassifierError::LoadError(format!(
                    "Emotion '{}' is mapped more than once",
                    emotion
                )));
            }
            labels.insert(index, emotion);
        }
        Ok(Self { labels })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let names: BTreeMap<usize, String> = read_json(path.as_ref())?;
        Self::from_names(names)
    }

    /// The mapping most emotion datasets ship with: sadness, joy, love, anger,
    /// fear, surprise at indices 0 through 5.
    pub fn standard() -> Self {
        Self {
            labels: Emotion::ALL.iter().copied().enumerate().collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<Emotion> {
        self.labels.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, Emotion)> + '_ {
        self.labels.iter().map(|(i, e)| (*i, *e))
    }

    pub fn emotions(&self) -> Vec<Emotion> {
        self.labels.values().copied().collect()
    }

    pub fn to_names(&self) -> BTreeMap<usize, String> {
        self.labels
            .iter()
            .map(|(i, e)| (*i, e.as_str().to_string()))
            .collect()
    }
}
