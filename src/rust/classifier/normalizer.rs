use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;

/// The 32 ASCII punctuation characters removed during normalization.
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// English stopwords applied by the `full` variant.
///
/// Entries carrying an apostrophe can never match once punctuation has been
/// stripped; they are kept so the table stays identical to the one the
/// vectorizer was fitted with.
pub const ENGLISH_STOPWORDS: [&str; 179] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're",
    "you've", "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "she's", "her", "hers", "herself", "it",
    "it's", "its", "itself", "they", "them", "their", "theirs", "themselves",
    "what", "which", "who", "whom", "this", "that", "that'll", "these", "those",
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if",
    "or", "because", "as", "until", "while", "of", "at", "by", "for", "with",
    "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where",
    "why", "how", "all", "any", "both", "each", "few", "more", "most", "other",
    "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've",
    "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn",
    "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn",
    "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn", "mightn't",
    "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Shorter stopword table applied by the `compact` variant.
pub const COMPACT_STOPWORDS: [&str; 87] = [
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your",
    "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she", "her",
    "hers", "herself", "it", "its", "itself", "they", "them", "their", "theirs",
    "themselves", "what", "which", "who", "whom", "this", "that", "these", "those",
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if",
    "or", "because", "as", "until", "while", "of", "at", "by", "for", "with",
    "through", "during", "before", "after", "above", "below", "up", "down", "in",
    "out", "on", "off", "over", "under", "again", "further", "then", "once",
];

lazy_static! {
    static ref ENGLISH_STOPWORD_SET: HashSet<&'static str> =
        ENGLISH_STOPWORDS.iter().copied().collect();
    static ref COMPACT_STOPWORD_SET: HashSet<&'static str> =
        COMPACT_STOPWORDS.iter().copied().collect();
}

/// Selects which preprocessing pipeline a set of artifacts was fitted with.
///
/// A mismatch between the variant used at training time and the one used at
/// inference time does not fail; it only degrades accuracy. The variant is
/// therefore part of the artifact configuration, never a global constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizationVariant {
    /// Lowercase, punctuation, digits, non-ASCII, English stopwords.
    #[default]
    Full,
    /// Lowercase, punctuation, compact stopwords. Digits and non-ASCII survive.
    Compact,
}

impl NormalizationVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Compact => "compact",
        }
    }

    fn stopwords(&self) -> &'static HashSet<&'static str> {
        match self {
            Self::Full => &ENGLISH_STOPWORD_SET,
            Self::Compact => &COMPACT_STOPWORD_SET,
        }
    }
}

impl fmt::Display for NormalizationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalizationVariant {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "compact" => Ok(Self::Compact),
            other => Err(ClassifierError::ValidationError(format!(
                "Unknown normalization variant '{}' (expected 'full' or 'compact')",
                other
            ))),
        }
    }
}

/// Deterministic text cleaner shared by training and inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Normalizer {
    variant: NormalizationVariant,
}

impl Normalizer {
    pub fn new(variant: NormalizationVariant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> NormalizationVariant {
        self.variant
    }

    /// Cleans `text` into a single-spaced, stopword-free token string.
    ///
    /// Never fails: any input, the empty string included, yields a possibly
    /// empty output. Applying it to its own output is a no-op.
    ///
    /// # Example
    /// ```
    /// use limbic::{Normalizer, NormalizationVariant};
    ///
    /// let normalizer = Normalizer::new(NormalizationVariant::Full);
    /// assert_eq!(normalizer.normalize("I LOVE this!!! 123 😀"), "love");
    /// ```
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped: String = match self.variant {
            NormalizationVariant::Full => lowered
                .chars()
                .filter(|c| !is_punctuation(*c))
                .filter(|c| !c.is_ascii_digit())
                .filter(|c| c.is_ascii())
                .collect(),
            NormalizationVariant::Compact => lowered
                .chars()
                .filter(|c| !is_punctuation(*c))
                .collect(),
        };

        let stopwords = self.variant.stopwords();
        stripped
            .split(is_separator)
            .filter(|token| !token.is_empty() && !stopwords.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.variant.stopwords().contains(token)
    }
}

/// Normalizes `text` with the default (`full`) variant.
pub fn normalize(text: &str) -> String {
    Normalizer::default().normalize(text)
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii() && PUNCTUATION.contains(c)
}

// Unicode whitespace plus the ASCII file/group/record/unit separators, which
// the training-side tokenizer also splits on.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}
