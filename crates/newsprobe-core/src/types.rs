//! Core types shared by the artifact and serving layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single predicted label as stored in a classifier artifact.
///
/// Training pipelines emit labels as strings most of the time, but integer,
/// float and boolean class values are accepted and rendered to text when a
/// prediction leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelValue {
    /// Boolean class value
    Bool(bool),

    /// Integer class value
    Integer(i64),

    /// Floating point class value
    Float(f64),

    /// Textual class value, e.g. "FAKE" or "REAL"
    Text(String),
}

impl fmt::Display for LabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write_float(f, *x),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
        }
    }
}

/// Shortest round-trip digits, in the same shape as Python's float repr:
/// scientific notation outside `1e-4 <= |x| < 1e16`, and integral values
/// keep one fractional digit ("1.0", not "1").
fn write_float(f: &mut fmt::Formatter<'_>, x: f64) -> fmt::Result {
    if x.is_nan() {
        return f.write_str("nan");
    }
    if x.is_infinite() {
        return f.write_str(if x > 0.0 { "inf" } else { "-inf" });
    }
    if x == 0.0 {
        return f.write_str(if x.is_sign_negative() { "-0.0" } else { "0.0" });
    }

    let scientific = format!("{x:e}");
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return write!(f, "{mantissa}e{sign}{:02}", exponent.abs());
    }

    let plain = x.to_string();
    if plain.contains('.') {
        f.write_str(&plain)
    } else {
        write!(f, "{plain}.0")
    }
}

impl From<&str> for LabelValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for LabelValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One sparse feature row: `(column, value)` pairs sorted by column,
/// with no duplicate columns and no explicit zeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow {
    entries: Vec<(usize, f64)>,
}

impl SparseRow {
    /// Build a row from `(column, value)` pairs in any order.
    ///
    /// Values for repeated columns are summed; zero results are dropped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = pairs.into_iter().collect();
        entries.sort_unstable_by_key(|(col, _)| *col);

        let mut merged: Vec<(usize, f64)> = Vec::with_capacity(entries.len());
        for (col, value) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == col => *acc += value,
                _ => merged.push((col, value)),
            }
        }
        merged.retain(|(_, v)| *v != 0.0);

        Self { entries: merged }
    }

    /// Iterate over `(column, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// True if the row has no non-zero entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `column`, zero if absent
    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |(col, _)| *col)
            .map(|idx| self.entries[idx].1)
            .unwrap_or(0.0)
    }

    /// Dot product against a dense weight vector.
    ///
    /// Columns beyond the end of `dense` contribute nothing.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|(col, value)| dense.get(*col).map(|w| w * value))
            .sum()
    }

    /// Apply `f` to every stored value
    pub fn map_values(mut self, mut f: impl FnMut(usize, f64) -> f64) -> Self {
        for (col, value) in &mut self.entries {
            *value = f(*col, *value);
        }
        self.entries.retain(|(_, v)| *v != 0.0);
        self
    }

    /// Sum of absolute values
    pub fn norm_l1(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v.abs()).sum()
    }

    /// Euclidean norm
    pub fn norm_l2(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }
}

/// Feature representation produced by a vectorizer: one sparse row per
/// input document, all sharing the same column space.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    n_features: usize,
    rows: Vec<SparseRow>,
}

impl FeatureMatrix {
    /// Create a matrix over `n_features` columns
    pub fn new(n_features: usize, rows: Vec<SparseRow>) -> Self {
        Self { n_features, rows }
    }

    /// Width of the column space
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of rows (documents)
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Rows in input order
    pub fn rows(&self) -> &[SparseRow] {
        &self.rows
    }
}
