//! Service configuration
//!
//! Values come from, in increasing precedence: built-in defaults, the
//! optional YAML config file, then CLI flags and environment variables.

use crate::cli::Cli;
use newsprobe_classifiers::{install_dir, ArtifactPaths};
use newsprobe_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Classifier artifact override
    #[serde(default)]
    pub model_path: Option<String>,

    /// Vectorizer artifact override
    #[serde(default)]
    pub vectorizer_path: Option<String>,

    /// Directory holding the default artifact files; the executable's
    /// directory when unset
    #[serde(default)]
    pub artifact_dir: Option<PathBuf>,

    /// Load artifacts in the background at startup
    #[serde(default = "default_true")]
    pub eager_load: bool,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServiceConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &Cli) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        config.apply_cli(cli);
        Ok(config)
    }

    /// Parse a YAML config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Apply CLI/environment overrides. Empty artifact paths do not
    /// override.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.host = host.clone();
        }

        if let Some(port) = cli.port {
            self.port = port;
        }

        if let Some(model_path) = non_empty(cli.model_path.as_deref()) {
            self.model_path = Some(model_path.to_string());
        }

        if let Some(vectorizer_path) = non_empty(cli.vectorizer_path.as_deref()) {
            self.vectorizer_path = Some(vectorizer_path.to_string());
        }

        if let Some(dir) = &cli.artifact_dir {
            self.artifact_dir = Some(dir.clone());
        }

        if cli.no_eager_load {
            self.eager_load = false;
        }
    }

    /// Resolve the two artifact paths
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let base_dir = self.artifact_dir.clone().unwrap_or_else(install_dir);
        ArtifactPaths::resolve(
            base_dir,
            self.model_path.as_deref(),
            self.vectorizer_path.as_deref(),
        )
    }

    /// Socket address to bind
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::config(format!("invalid listen address {}:{}: {}", self.host, self.port, e)))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model_path: None,
            vectorizer_path: None,
            artifact_dir: None,
            eager_load: true,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}
