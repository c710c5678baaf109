//! Bag-of-words vectorizers restored from artifact files
//!
//! Two kinds are supported, selected by the `kind` field of the artifact:
//! - `count`: term counts over a fixed vocabulary
//! - `tfidf`: term counts re-weighted by inverse document frequency and
//!   normalized per row

use crate::classifier::Vectorizer;
use newsprobe_core::{Error, FeatureMatrix, Result, SparseRow};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Default token pattern: runs of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Serialized form of a vectorizer artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorizerSpec {
    /// Plain term counts
    Count(CountSpec),

    /// TF-IDF weighted terms
    Tfidf(TfidfSpec),
}

impl VectorizerSpec {
    /// Validate the artifact and build a ready-to-use vectorizer
    pub fn build(self) -> Result<Box<dyn Vectorizer>> {
        match self {
            Self::Count(spec) => Ok(Box::new(CountVectorizer::from_spec(spec)?)),
            Self::Tfidf(spec) => Ok(Box::new(TfidfVectorizer::from_spec(spec)?)),
        }
    }
}

/// Tokenization and vocabulary settings shared by both kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountSpec {
    /// Term to column mapping
    pub vocabulary: HashMap<String, usize>,

    /// Lowercase documents before tokenizing
    #[serde(default = "default_true")]
    pub lowercase: bool,

    /// Regex selecting tokens; a single capture group selects the token text
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,

    /// Inclusive range of word n-gram sizes
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),

    /// Tokens dropped before n-grams are formed
    #[serde(default)]
    pub stop_words: Vec<String>,

    /// Record presence (1.0) instead of counts
    #[serde(default)]
    pub binary: bool,
}

/// TF-IDF artifact: count settings plus the fitted idf weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfSpec {
    #[serde(flatten)]
    pub count: CountSpec,

    /// Inverse document frequency per column
    pub idf: Vec<f64>,

    /// Row normalization
    #[serde(default)]
    pub norm: Norm,

    /// Replace tf with 1 + ln(tf)
    #[serde(default)]
    pub sublinear_tf: bool,
}

/// Per-row normalization applied by the TF-IDF vectorizer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    #[default]
    L2,
    None,
}

fn default_true() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Term-count vectorizer over a fixed vocabulary
#[derive(Debug)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    token_pattern: Regex,
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
}

impl CountVectorizer {
    /// Build from a deserialized artifact, validating it
    pub fn from_spec(spec: CountSpec) -> Result<Self> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(Error::config(format!(
                "invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        let n_features = spec.vocabulary.len();
        let mut seen = vec![false; n_features];
        for (term, &column) in &spec.vocabulary {
            match seen.get_mut(column) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(Error::config(format!(
                        "vocabulary column {} assigned twice (term '{}')",
                        column, term
                    )))
                }
                None => {
                    return Err(Error::config(format!(
                        "vocabulary column {} for term '{}' exceeds vocabulary size {}",
                        column, term, n_features
                    )))
                }
            }
        }

        let token_pattern = Regex::new(&spec.token_pattern).map_err(|e| {
            Error::config(format!("invalid token_pattern '{}': {}", spec.token_pattern, e))
        })?;
        if token_pattern.captures_len() > 2 {
            return Err(Error::config(
                "token_pattern may contain at most one capture group",
            ));
        }

        Ok(Self {
            vocabulary: spec.vocabulary,
            token_pattern,
            lowercase: spec.lowercase,
            ngram_range: spec.ngram_range,
            stop_words: spec.stop_words.into_iter().collect(),
            binary: spec.binary,
        })
    }

    /// Split a document into tokens, after lowercasing and stop word removal
    pub fn tokenize<'a>(&self, document: &'a str) -> Vec<String> {
        let text: Cow<'a, str> = if self.lowercase {
            Cow::Owned(document.to_lowercase())
        } else {
            Cow::Borrowed(document)
        };

        let tokens: Vec<String> = if self.token_pattern.captures_len() == 2 {
            self.token_pattern
                .captures_iter(&text)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
                .collect()
        } else {
            self.token_pattern
                .find_iter(&text)
                .map(|m| m.as_str().to_string())
                .collect()
        };

        tokens
            .into_iter()
            .filter(|token| !self.stop_words.contains(token))
            .collect()
    }

    /// Count vocabulary hits for one document
    fn count_row(&self, document: &str) -> SparseRow {
        let tokens = self.tokenize(document);
        let (min_n, max_n) = self.ngram_range;

        let mut hits = Vec::new();
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&column) = self.vocabulary.get(&term) {
                    hits.push((column, 1.0));
                }
            }
        }

        let row = SparseRow::from_pairs(hits);
        if self.binary {
            row.map_values(|_, _| 1.0)
        } else {
            row
        }
    }
}

impl Vectorizer for CountVectorizer {
    fn transform(&self, documents: &[&str]) -> Result<FeatureMatrix> {
        let rows = documents.iter().map(|doc| self.count_row(doc)).collect();
        Ok(FeatureMatrix::new(self.n_features(), rows))
    }

    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    fn name(&self) -> &str {
        "count"
    }
}

/// TF-IDF vectorizer: counts, optional sublinear scaling, idf weights,
/// then row normalization
#[derive(Debug)]
pub struct TfidfVectorizer {
    counts: CountVectorizer,
    idf: Vec<f64>,
    norm: Norm,
    sublinear_tf: bool,
}

impl TfidfVectorizer {
    /// Build from a deserialized artifact, validating it
    pub fn from_spec(spec: TfidfSpec) -> Result<Self> {
        let counts = CountVectorizer::from_spec(spec.count)?;
        if spec.idf.len() != counts.n_features() {
            return Err(Error::config(format!(
                "idf has {} weights but vocabulary has {} terms",
                spec.idf.len(),
                counts.n_features()
            )));
        }
        if spec.idf.iter().any(|w| !w.is_finite()) {
            return Err(Error::config("idf weights must be finite"));
        }

        Ok(Self {
            counts,
            idf: spec.idf,
            norm: spec.norm,
            sublinear_tf: spec.sublinear_tf,
        })
    }

    fn weigh(&self, row: SparseRow) -> SparseRow {
        let sublinear = self.sublinear_tf;
        let row = row.map_values(|column, tf| {
            let tf = if sublinear { 1.0 + tf.ln() } else { tf };
            tf * self.idf[column]
        });

        let scale = match self.norm {
            Norm::L1 => row.norm_l1(),
            Norm::L2 => row.norm_l2(),
            Norm::None => 1.0,
        };
        if scale > 0.0 && scale != 1.0 {
            row.map_values(|_, v| v / scale)
        } else {
            row
        }
    }
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, documents: &[&str]) -> Result<FeatureMatrix> {
        let rows = documents
            .iter()
            .map(|doc| self.weigh(self.counts.count_row(doc)))
            .collect();
        Ok(FeatureMatrix::new(self.n_features(), rows))
    }

    fn n_features(&self) -> usize {
        self.counts.n_features()
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}
