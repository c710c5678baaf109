//! NewsProbe Core
//!
//! Core types and error handling shared across NewsProbe components.
//!
//! This crate provides:
//! - The error taxonomy used from artifact loading up to the HTTP surface
//! - Label values as stored in classifier artifacts
//! - Sparse feature rows exchanged between vectorizers and classifiers

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{FeatureMatrix, LabelValue, SparseRow};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{FeatureMatrix, LabelValue, SparseRow};
}
