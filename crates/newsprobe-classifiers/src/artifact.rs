//! Artifact store: path resolution and deserialization of the vectorizer
//! and classifier files

use crate::classifier::{Classifier, Vectorizer};
use crate::models::ClassifierSpec;
use crate::vectorizer::VectorizerSpec;
use newsprobe_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// File name of the classifier artifact inside the installation directory
pub const DEFAULT_MODEL_FILE: &str = "basic_classifier.json";

/// File name of the vectorizer artifact inside the installation directory
pub const DEFAULT_VECTORIZER_FILE: &str = "count_vectorizer.json";

/// Resolved locations of the two artifact files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    /// Classifier artifact
    pub model: PathBuf,

    /// Vectorizer artifact
    pub vectorizer: PathBuf,
}

impl ArtifactPaths {
    /// Create paths from explicit locations
    pub fn new(model: impl Into<PathBuf>, vectorizer: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            vectorizer: vectorizer.into(),
        }
    }

    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(DEFAULT_MODEL_FILE), dir.join(DEFAULT_VECTORIZER_FILE))
    }

    /// Resolve each path as its override when non-empty, else the default
    /// file inside `base_dir`.
    pub fn resolve(
        base_dir: impl AsRef<Path>,
        model_override: Option<&str>,
        vectorizer_override: Option<&str>,
    ) -> Self {
        let defaults = Self::in_dir(base_dir);
        let pick = |value: Option<&str>, default: PathBuf| match value {
            Some(v) if !v.is_empty() => PathBuf::from(v),
            _ => default,
        };

        Self {
            model: pick(model_override, defaults.model),
            vectorizer: pick(vectorizer_override, defaults.vectorizer),
        }
    }
}

/// Directory the service is installed in: the directory holding the
/// running executable, else the current working directory.
pub fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Encoding of an artifact file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
}

impl ArtifactFormat {
    /// `.yaml`/`.yml` are YAML; everything else is read as JSON
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> std::result::Result<T, String> {
        match self {
            Self::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_slice(bytes).map_err(|e| e.to_string()),
        }
    }
}

/// Where a loaded artifact came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    /// File the artifact was read from
    pub path: PathBuf,

    /// Hex SHA-256 of the file contents
    pub fingerprint: String,

    /// File size in bytes
    pub size_bytes: usize,
}

/// The vectorizer/classifier pair, ready for inference
pub struct LoadedArtifacts {
    vectorizer: Box<dyn Vectorizer>,
    classifier: Box<dyn Classifier>,
    vectorizer_info: Option<ArtifactInfo>,
    model_info: Option<ArtifactInfo>,
}

impl LoadedArtifacts {
    /// Pair an already-built vectorizer and classifier
    pub fn new(vectorizer: Box<dyn Vectorizer>, classifier: Box<dyn Classifier>) -> Self {
        Self {
            vectorizer,
            classifier,
            vectorizer_info: None,
            model_info: None,
        }
    }

    /// Attach file provenance
    pub fn with_provenance(mut self, vectorizer: ArtifactInfo, model: ArtifactInfo) -> Self {
        self.vectorizer_info = Some(vectorizer);
        self.model_info = Some(model);
        self
    }

    pub fn vectorizer(&self) -> &dyn Vectorizer {
        self.vectorizer.as_ref()
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn model_info(&self) -> Option<&ArtifactInfo> {
        self.model_info.as_ref()
    }
}

impl fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("vectorizer", &self.vectorizer.name())
            .field("classifier", &self.classifier.name())
            .field("n_features", &self.vectorizer.n_features())
            .field("vectorizer_info", &self.vectorizer_info)
            .field("model_info", &self.model_info)
            .finish()
    }
}

/// Something that can produce the artifact pair.
///
/// `load` does the physical work (file reads, deserialization) every time
/// it is called; deduplicating calls is the coordinator's job.
pub trait ArtifactSource: Send + Sync {
    fn load(&self) -> Result<LoadedArtifacts>;
}

/// Reads both artifacts from the filesystem
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    paths: ArtifactPaths,
}

impl ArtifactStore {
    /// Create a store reading from the given paths
    pub fn new(paths: ArtifactPaths) -> Self {
        Self { paths }
    }
}

impl ArtifactSource for ArtifactStore {
    fn load(&self) -> Result<LoadedArtifacts> {
        let start = Instant::now();
        info!(
            model = %self.paths.model.display(),
            vectorizer = %self.paths.vectorizer.display(),
            "Loading artifacts"
        );

        let (classifier_spec, model_info) =
            read_artifact::<ClassifierSpec>(&self.paths.model)?;
        let classifier = classifier_spec
            .build()
            .map_err(|e| into_corrupt(&self.paths.model, e))?;

        let (vectorizer_spec, vectorizer_info) =
            read_artifact::<VectorizerSpec>(&self.paths.vectorizer)?;
        let vectorizer = vectorizer_spec
            .build()
            .map_err(|e| into_corrupt(&self.paths.vectorizer, e))?;

        if classifier.n_features() != vectorizer.n_features() {
            return Err(Error::artifact_corrupt(
                &self.paths.model,
                format!(
                    "classifier expects {} features but vectorizer produces {}",
                    classifier.n_features(),
                    vectorizer.n_features()
                ),
            ));
        }

        info!(
            classifier = classifier.name(),
            vectorizer = vectorizer.name(),
            n_features = vectorizer.n_features(),
            n_classes = classifier.classes().len(),
            model_sha256 = %model_info.fingerprint,
            model_bytes = model_info.size_bytes,
            vectorizer_sha256 = %vectorizer_info.fingerprint,
            vectorizer_bytes = vectorizer_info.size_bytes,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Artifacts loaded"
        );

        Ok(LoadedArtifacts::new(vectorizer, classifier)
            .with_provenance(vectorizer_info, model_info))
    }
}

/// Read and decode one artifact file
fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<(T, ArtifactInfo)> {
    if !path.exists() {
        return Err(Error::artifact_not_found(path));
    }

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::artifact_not_found(path),
        _ => Error::artifact_corrupt(path, format!("unreadable: {}", e)),
    })?;

    let format = ArtifactFormat::from_path(path);
    debug!(path = %path.display(), ?format, size = bytes.len(), "Decoding artifact");

    let spec = format
        .decode(&bytes)
        .map_err(|reason| Error::artifact_corrupt(path, reason))?;

    let info = ArtifactInfo {
        path: path.to_path_buf(),
        fingerprint: fingerprint(&bytes),
        size_bytes: bytes.len(),
    };

    Ok((spec, info))
}

/// Validation failures while building an artifact become corruption of
/// that file
fn into_corrupt(path: &Path, err: Error) -> Error {
    match err {
        Error::Config(reason) => Error::artifact_corrupt(path, reason),
        other => other,
    }
}

/// Hex SHA-256 of `bytes`
pub fn fingerprint(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
