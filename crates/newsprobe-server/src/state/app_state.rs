use crate::config::ServiceConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use newsprobe_classifiers::{ArtifactPaths, ArtifactStore, LoadCoordinator, Predictor};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Effective service configuration
    pub config: Arc<ServiceConfig>,

    /// Resolved artifact locations, reported by the health endpoint
    pub paths: Arc<ArtifactPaths>,

    /// Inference entry point; owns the load coordinator
    pub predictor: Predictor,

    /// Prometheus handle for `/metrics`; absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state over the filesystem artifact store
    pub fn new(config: ServiceConfig) -> Self {
        let paths = config.artifact_paths();
        let coordinator = LoadCoordinator::from_store(ArtifactStore::new(paths.clone()));
        Self::with_coordinator(config, paths, Arc::new(coordinator))
    }

    /// Build state over an existing coordinator
    pub fn with_coordinator(
        config: ServiceConfig,
        paths: ArtifactPaths,
        coordinator: Arc<LoadCoordinator>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            paths: Arc::new(paths),
            predictor: Predictor::new(coordinator),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn coordinator(&self) -> &Arc<LoadCoordinator> {
        self.predictor.coordinator()
    }

    pub fn model_loaded(&self) -> bool {
        self.coordinator().is_loaded()
    }
}
