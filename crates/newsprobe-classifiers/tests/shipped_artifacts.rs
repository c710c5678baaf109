//! The sample artifact pair under `artifacts/` at the repository root

use newsprobe_classifiers::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const HEADLINES: &[(&str, &str)] = &[
    ("Eiffel Tower washes up on Delaware Beach.", "FAKE"),
    ("University of Toronto moved to Montreal", "FAKE"),
    ("The Prime Minister announced new economic policies", "REAL"),
    ("Syria's President Meets Trump at White House for First Time", "REAL"),
];

fn sample_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../artifacts")
}

#[test]
fn test_sample_artifacts_load() {
    let artifacts = ArtifactStore::new(ArtifactPaths::in_dir(sample_dir()))
        .load()
        .unwrap();

    assert_eq!(artifacts.classifier().name(), "multinomial_nb");
    assert_eq!(
        artifacts.classifier().n_features(),
        artifacts.vectorizer().n_features()
    );
    assert_eq!(artifacts.classifier().classes().len(), 2);
}

#[test]
fn test_sample_artifacts_classify_reference_headlines() {
    let store = ArtifactStore::new(ArtifactPaths::in_dir(sample_dir()));
    let predictor = Predictor::new(Arc::new(LoadCoordinator::from_store(store)));

    for (headline, expected) in HEADLINES {
        assert_eq!(
            predictor.predict(headline).unwrap(),
            *expected,
            "headline {headline:?}"
        );
    }
    assert_eq!(predictor.coordinator().load_attempts(), 1);
}
