//! NewsProbe HTTP service
//!
//! Axum front end over the newsprobe classifiers: a health check, a JSON
//! prediction API, and a small server-rendered demo page.

pub mod cli;
pub mod config;
pub mod server;
pub mod state;

pub use cli::*;
pub use config::*;
pub use server::*;
pub use state::*;
