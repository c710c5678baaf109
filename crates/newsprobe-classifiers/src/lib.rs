//! NewsProbe Classifiers
//!
//! Loads a pre-trained text vectorizer and classifier from disk and runs
//! single-message inference with them.
//!
//! The pieces, leaves first:
//! - [`artifact`]: resolves artifact paths and deserializes the two files
//! - [`coordinator`]: makes the load happen at most once per process, eagerly
//!   in the background or lazily on first use
//! - [`inference`]: turns one message into one label string
//!
//! Vectorizers and classifiers are used only through the [`Vectorizer`] and
//! [`Classifier`] capability traits; the concrete kinds in [`vectorizer`]
//! and [`models`] are what the artifact files deserialize into.

pub mod artifact;
pub mod classifier;
pub mod coordinator;
pub mod inference;
pub mod models;
pub mod vectorizer;

pub use artifact::{
    install_dir, ArtifactFormat, ArtifactInfo, ArtifactPaths, ArtifactSource, ArtifactStore,
    LoadedArtifacts, DEFAULT_MODEL_FILE, DEFAULT_VECTORIZER_FILE,
};
pub use classifier::{Classifier, Vectorizer};
pub use coordinator::{LoadCoordinator, LoadState};
pub use inference::{predict_with, Predictor};
pub use models::{ClassifierSpec, LinearClassifier, MultinomialNb};
pub use vectorizer::{CountVectorizer, Norm, TfidfVectorizer, VectorizerSpec};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::artifact::{ArtifactPaths, ArtifactSource, ArtifactStore, LoadedArtifacts};
    pub use crate::classifier::{Classifier, Vectorizer};
    pub use crate::coordinator::{LoadCoordinator, LoadState};
    pub use crate::inference::Predictor;
}
