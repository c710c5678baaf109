//! Capability traits implemented by loaded artifacts

use newsprobe_core::{FeatureMatrix, LabelValue, Result};

/// Turns raw documents into a feature representation.
///
/// Implementations are immutable once loaded and are shared across threads
/// without locking.
pub trait Vectorizer: Send + Sync {
    /// Transform documents into one feature row per document
    fn transform(&self, documents: &[&str]) -> Result<FeatureMatrix>;

    /// Width of the produced feature space
    fn n_features(&self) -> usize;

    /// Get the vectorizer kind name
    fn name(&self) -> &str;
}

/// Maps feature rows to predicted labels.
pub trait Classifier: Send + Sync {
    /// Predict one label per feature row
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<LabelValue>>;

    /// Number of features the classifier was trained on
    fn n_features(&self) -> usize;

    /// Known classes, in the order the classifier scores them
    fn classes(&self) -> &[LabelValue];

    /// Get the classifier kind name
    fn name(&self) -> &str;
}

/// Index of the highest score; the first one wins ties.
///
/// Returns `None` for an empty slice or when any score is NaN.
pub(crate) fn argmax(scores: &[f64]) -> Option<usize> {
    if scores.iter().any(|s| s.is_nan()) {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}
