//! One-message-in, one-label-out inference

use crate::artifact::LoadedArtifacts;
use crate::coordinator::LoadCoordinator;
use newsprobe_core::{Error, Result};
use std::sync::Arc;
use tracing::debug;

/// Runs predictions against the coordinator's artifacts, loading them on
/// first use.
#[derive(Debug, Clone)]
pub struct Predictor {
    coordinator: Arc<LoadCoordinator>,
}

impl Predictor {
    pub fn new(coordinator: Arc<LoadCoordinator>) -> Self {
        Self { coordinator }
    }

    /// The coordinator backing this predictor
    pub fn coordinator(&self) -> &Arc<LoadCoordinator> {
        &self.coordinator
    }

    /// Classify a single message and return its label as text.
    ///
    /// Artifact errors from loading pass through unchanged; anything that
    /// goes wrong inside the vectorizer or classifier is an
    /// [`Error::Inference`].
    pub fn predict(&self, message: &str) -> Result<String> {
        let artifacts = self.coordinator.ensure_loaded()?;
        predict_with(&artifacts, message)
    }

    /// [`predict`](Self::predict) on the blocking pool, for async callers
    pub async fn predict_blocking(&self, message: String) -> Result<String> {
        let predictor = self.clone();
        tokio::task::spawn_blocking(move || predictor.predict(&message))
            .await
            .map_err(|e| Error::inference(format!("prediction task failed: {}", e)))?
    }
}

/// Classify `message` with already-loaded artifacts
pub fn predict_with(artifacts: &LoadedArtifacts, message: &str) -> Result<String> {
    let features = artifacts
        .vectorizer()
        .transform(&[message])
        .map_err(as_inference)?;

    let predictions = artifacts
        .classifier()
        .predict(&features)
        .map_err(as_inference)?;

    let label = predictions
        .into_iter()
        .next()
        .ok_or_else(|| Error::inference("classifier returned no prediction"))?
        .to_string();

    debug!(%label, chars = message.chars().count(), "Prediction");
    Ok(label)
}

fn as_inference(err: Error) -> Error {
    match err {
        Error::Inference(_) => err,
        other => Error::inference(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{ArtifactPaths, ArtifactStore};
    use crate::classifier::{Classifier, Vectorizer};
    use newsprobe_core::{FeatureMatrix, LabelValue, SparseRow};
    use proptest::prelude::*;
    use std::fs;

    const VECTORIZER: &str = r#"{
        "kind": "count",
        "vocabulary": {"eiffel": 0, "tower": 1, "prime": 2, "minister": 3, "economic": 4}
    }"#;
    const MODEL: &str = r#"{
        "kind": "multinomial_nb",
        "classes": ["FAKE", "REAL"],
        "class_log_prior": [-0.693, -0.693],
        "feature_log_prob": [
            [-1.0, -1.0, -3.0, -3.0, -3.0],
            [-3.0, -3.0, -1.0, -1.0, -1.0]
        ]
    }"#;

    fn predictor_in(dir: &std::path::Path) -> Predictor {
        let paths = ArtifactPaths::in_dir(dir);
        fs::write(&paths.model, MODEL).unwrap();
        fs::write(&paths.vectorizer, VECTORIZER).unwrap();
        Predictor::new(Arc::new(LoadCoordinator::from_store(ArtifactStore::new(paths))))
    }

    struct FailingVectorizer;

    impl Vectorizer for FailingVectorizer {
        fn transform(&self, _documents: &[&str]) -> Result<FeatureMatrix> {
            Err(Error::internal("tokenizer state poisoned"))
        }

        fn n_features(&self) -> usize {
            1
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SilentClassifier;

    impl Classifier for SilentClassifier {
        fn predict(&self, _features: &FeatureMatrix) -> Result<Vec<LabelValue>> {
            Ok(Vec::new())
        }

        fn n_features(&self) -> usize {
            1
        }

        fn classes(&self) -> &[LabelValue] {
            &[]
        }

        fn name(&self) -> &str {
            "silent"
        }
    }

    struct NumericClassifier;

    impl Classifier for NumericClassifier {
        fn predict(&self, features: &FeatureMatrix) -> Result<Vec<LabelValue>> {
            Ok(vec![LabelValue::Integer(1); features.n_rows()])
        }

        fn n_features(&self) -> usize {
            1
        }

        fn classes(&self) -> &[LabelValue] {
            &[]
        }

        fn name(&self) -> &str {
            "numeric"
        }
    }

    struct EmptyVectorizer;

    impl Vectorizer for EmptyVectorizer {
        fn transform(&self, documents: &[&str]) -> Result<FeatureMatrix> {
            Ok(FeatureMatrix::new(1, vec![SparseRow::default(); documents.len()]))
        }

        fn n_features(&self) -> usize {
            1
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    #[test]
    fn test_predicts_known_examples() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = predictor_in(dir.path());

        assert_eq!(
            predictor.predict("The Prime Minister announced new economic policies").unwrap(),
            "REAL"
        );
        assert_eq!(
            predictor.predict("Eiffel Tower washes up on Delaware Beach.").unwrap(),
            "FAKE"
        );
        assert_eq!(predictor.coordinator().load_attempts(), 1);
    }

    #[test]
    fn test_missing_artifacts_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(ArtifactPaths::in_dir(dir.path()));
        let predictor = Predictor::new(Arc::new(LoadCoordinator::from_store(store)));

        let err = predictor.predict("anything").unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound { .. }), "got {err:?}");
    }

    #[test]
    fn test_vectorizer_failure_becomes_inference_error() {
        let artifacts = LoadedArtifacts::new(Box::new(FailingVectorizer), Box::new(SilentClassifier));
        let err = predict_with(&artifacts, "hello").unwrap_err();
        assert!(matches!(err, Error::Inference(_)), "got {err:?}");
    }

    #[test]
    fn test_empty_prediction_is_inference_error() {
        let artifacts = LoadedArtifacts::new(Box::new(EmptyVectorizer), Box::new(SilentClassifier));
        let err = predict_with(&artifacts, "hello").unwrap_err();
        assert!(matches!(err, Error::Inference(_)), "got {err:?}");
    }

    #[test]
    fn test_numeric_labels_are_stringified() {
        let artifacts = LoadedArtifacts::new(Box::new(EmptyVectorizer), Box::new(NumericClassifier));
        assert_eq!(predict_with(&artifacts, "hello").unwrap(), "1");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_predict_blocking() {
        let dir = tempfile::tempdir().unwrap();
        let predictor = predictor_in(dir.path());

        let label = predictor
            .predict_blocking("Prime minister on economic policy".to_string())
            .await
            .unwrap();
        assert_eq!(label, "REAL");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_prediction_is_deterministic(message in "\\PC{0,80}") {
            let dir = tempfile::tempdir().unwrap();
            let predictor = predictor_in(dir.path());

            let first = predictor.predict(&message).unwrap();
            let second = predictor.predict(&message).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert!(first == "FAKE" || first == "REAL");
        }
    }
}
