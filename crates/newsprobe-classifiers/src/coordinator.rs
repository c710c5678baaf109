//! Load-once coordination for the artifact pair
//!
//! The coordinator owns the loaded artifacts and guarantees that the
//! expensive [`ArtifactSource::load`] succeeds at most once per process, no
//! matter how many threads ask for the artifacts concurrently.
//!
//! # State machine
//!
//! ```text
//! Unloaded ──► Loading ──► Loaded (terminal)
//!     ▲           │
//!     └─ failure ─┘
//! ```
//!
//! Failures are not cached: a failed attempt returns the coordinator to
//! `Unloaded` and the next caller tries again.
//!
//! # Locking
//!
//! - Fast path: a lock-free read of the published artifacts (`OnceLock`).
//! - Slow path: the state mutex decides who loads. The winner marks
//!   `Loading`, loads without holding the lock, then publishes. Everyone
//!   else waits on the condvar and re-checks.

use crate::artifact::{ArtifactSource, ArtifactStore, LoadedArtifacts};
use newsprobe_core::Result;
use parking_lot::{Condvar, Mutex};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle of the artifact pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Nothing loaded yet, or the last attempt failed
    Unloaded,
    /// A caller is currently reading the artifacts
    Loading,
    /// Artifacts are published; terminal
    Loaded,
}

/// Guards the one-time load of the artifact pair
pub struct LoadCoordinator {
    source: Arc<dyn ArtifactSource>,
    artifacts: OnceLock<Arc<LoadedArtifacts>>,
    state: Mutex<LoadState>,
    transition: Condvar,
    attempts: AtomicU64,
}

impl LoadCoordinator {
    /// Create a coordinator over any artifact source
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self {
        Self {
            source,
            artifacts: OnceLock::new(),
            state: Mutex::new(LoadState::Unloaded),
            transition: Condvar::new(),
            attempts: AtomicU64::new(0),
        }
    }

    /// Create a coordinator reading from the filesystem
    pub fn from_store(store: ArtifactStore) -> Self {
        Self::new(Arc::new(store))
    }

    /// True once the artifacts are published. Never takes a lock.
    pub fn is_loaded(&self) -> bool {
        self.artifacts.get().is_some()
    }

    /// Current lifecycle state
    pub fn state(&self) -> LoadState {
        if self.is_loaded() {
            return LoadState::Loaded;
        }
        *self.state.lock()
    }

    /// Artifacts if already loaded, without triggering a load
    pub fn loaded(&self) -> Option<Arc<LoadedArtifacts>> {
        self.artifacts.get().cloned()
    }

    /// Number of physical load attempts made so far
    pub fn load_attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Return the artifacts, loading them first if needed.
    ///
    /// Blocks while another caller is loading. Errors from the source are
    /// returned to every caller whose own attempt failed; nothing is cached.
    pub fn ensure_loaded(&self) -> Result<Arc<LoadedArtifacts>> {
        if let Some(artifacts) = self.artifacts.get() {
            return Ok(Arc::clone(artifacts));
        }

        let mut state = self.state.lock();
        loop {
            // Re-check under the lock: a concurrent loader may have won.
            if let Some(artifacts) = self.artifacts.get() {
                return Ok(Arc::clone(artifacts));
            }
            match *state {
                LoadState::Loading => {
                    debug!("Artifacts are being loaded by another caller, waiting");
                    self.transition.wait(&mut state);
                }
                LoadState::Unloaded | LoadState::Loaded => break,
            }
        }
        *state = LoadState::Loading;
        drop(state);

        let mut guard = LoadingGuard {
            coordinator: self,
            settled: false,
        };

        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        let start = Instant::now();
        let outcome = self.source.load();

        let mut state = self.state.lock();
        let result = match outcome {
            Ok(artifacts) => {
                let published = Arc::clone(self.artifacts.get_or_init(|| Arc::new(artifacts)));
                *state = LoadState::Loaded;
                metrics::counter!("newsprobe_artifact_loads_total", "outcome" => "success")
                    .increment(1);
                info!(
                    attempt,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Artifact load complete"
                );
                Ok(published)
            }
            Err(err) => {
                *state = LoadState::Unloaded;
                metrics::counter!("newsprobe_artifact_loads_total", "outcome" => "failure")
                    .increment(1);
                warn!(attempt, error = %err, "Artifact load failed");
                Err(err)
            }
        };
        guard.settled = true;
        drop(state);
        self.transition.notify_all();

        result
    }

    /// Start a best-effort background load.
    ///
    /// Runs on the blocking pool and never fails the caller; an error only
    /// leaves the coordinator `Unloaded` for the first request to retry.
    pub fn spawn_eager_load(self: &Arc<Self>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::task::spawn_blocking(move || match coordinator.ensure_loaded() {
            Ok(_) => info!("Background eager load finished"),
            Err(err) => warn!(
                error = %err,
                "Background eager load failed; artifacts will be loaded on first request"
            ),
        })
    }
}

impl fmt::Debug for LoadCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCoordinator")
            .field("state", &self.state())
            .field("attempts", &self.load_attempts())
            .finish()
    }
}

/// Returns the state to `Unloaded` if the source panics mid-load, so
/// waiters are released and a later call can retry.
struct LoadingGuard<'a> {
    coordinator: &'a LoadCoordinator,
    settled: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.coordinator.state.lock() = LoadState::Unloaded;
            self.coordinator.transition.notify_all();
        }
    }
}
