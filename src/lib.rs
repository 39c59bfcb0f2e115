//! riskwatch - Credit-risk model serving with live monitoring
//!
//! Serves predictions from a versioned classification model while
//! continuously monitoring the live model and orchestrating candidate
//! retraining.
//!
//! # Modules
//!
//! ## Serving
//! - [`registry`] - Atomic active-model registry and reload loop
//! - [`inference`] - Scoring engine with heuristic fallback, log sink
//! - [`server`] - HTTP surface and service wiring
//!
//! ## Monitoring
//! - [`monitor`] - Scheduler plus labeling, metrics, drift, and
//!   retrain jobs
//! - [`alert`] - Best-effort alert delivery
//!
//! ## Foundations
//! - [`domain`] - Record types and version tags
//! - [`model`] - The credit model and its artifact codec
//! - [`store`] - Persistence interfaces and the in-memory store

pub mod alert;
pub mod domain;
pub mod error;
pub mod inference;
pub mod model;
pub mod monitor;
pub mod registry;
pub mod server;
pub mod store;

pub use error::{Result, RiskwatchError};
