use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use log::debug;
use ndarray::Array1;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use crate::artifact_manager::read_json;

/// Token pattern used when the artifact does not carry one: runs of two or
/// more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_true() -> bool {
    true
}

/// On-disk form of a fitted bag-of-words vectorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// Token (or space-joined n-gram) to feature column.
    pub vocabulary: HashMap<String, usize>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default = "default_true")]
    pub lowercase: bool,
    /// Clamp every non-zero count to 1.
    #[serde(default)]
    pub binary: bool,
}

impl VectorizerArtifact {
    /// Builds an artifact with default settings from a list of terms, assigning
    /// columns in the given order.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = HashMap::new();
        for term in terms {
            let next = vocabulary.len();
            vocabulary.entry(term.into()).or_insert(next);
        }
        Self {
            vocabulary,
            ngram_range: default_ngram_range(),
            token_pattern: default_token_pattern(),
            lowercase: true,
            binary: false,
        }
    }
}

/// Sparse count vector over a fixed vocabulary. Entries are sorted by column
/// and never hold zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    dim: usize,
    entries: Vec<(usize, f64)>,
}

impl FeatureVector {
    pub fn zeros(dim: usize) -> Self {
        Self { dim, entries: Vec::new() }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of non-zero columns
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |(c, _)| *c)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Sum of all counts
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn to_dense(&self) -> Array1<f64> {
        let mut dense = Array1::zeros(self.dim);
        for &(column, value) in &self.entries {
            dense[column] = value;
        }
        dense
    }
}

/// A fitted bag-of-words vectorizer.
///
/// Terms missing from the vocabulary are dropped without error, so unknown
/// input degrades to an all-zero vector rather than failing.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    token_pattern: Regex,
    ngram_range: (usize, usize),
    lowercase: bool,
    binary: bool,
}

impl CountVectorizer {
    /// Validates an artifact and compiles its token pattern.
    ///
    /// # Errors
    /// - `LoadError` if the vocabulary is empty or its columns are not exactly `0..len`
    /// - `LoadError` if the n-gram range is invalid
    /// - `LoadError` if the token pattern does not compile
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self, ClassifierError> {
        if artifact.vocabulary.is_empty() {
            return Err(ClassifierError::LoadError("Vectorizer vocabulary is empty".into()));
        }

        let size = artifact.vocabulary.len();
        let mut seen = vec![false; size];
        for (term, &column) in &artifact.vocabulary {
            if column >= size || seen[column] {
                return Err(ClassifierError::LoadError(format!(
                    "Vocabulary column {} for term '{}' is out of range or duplicated (vocabulary size {})",
                    column, term, size
                )));
            }
            seen[column] = true;
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::LoadError(format!(
                "Invalid n-gram range ({}, {})",
                min_n, max_n
            )));
        }

        let token_pattern = Regex::new(&artifact.token_pattern).map_err(|e| {
            ClassifierError::LoadError(format!(
                "Invalid token pattern '{}': {}",
                artifact.token_pattern, e
            ))
        })?;

        Ok(Self {
            vocabulary: artifact.vocabulary,
            token_pattern,
            ngram_range: artifact.ngram_range,
            lowercase: artifact.lowercase,
            binary: artifact.binary,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let artifact: VectorizerArtifact = read_json(path.as_ref())?;
        debug!(
            "Read vectorizer with {} terms from {:?}",
            artifact.vocabulary.len(),
            path.as_ref()
        );
        Self::from_artifact(artifact)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn ngram_range(&self) -> (usize, usize) {
        self.ngram_range
    }

    /// Splits text into the terms the vocabulary is keyed by: pattern tokens,
    /// then space-joined n-grams for every `n` in the configured range.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let lowered;
        let text = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n.min(tokens.len()) {
            for window in tokens.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    /// Maps text to its sparse count vector.
    pub fn transform(&self, text: &str) -> FeatureVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in self.analyze(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let entries = counts
            .into_iter()
            .map(|(column, count)| (column, if self.binary { 1.0 } else { count }))
            .collect();

        FeatureVector {
            dim: self.vocabulary.len(),
            entries,
        }
    }
}
