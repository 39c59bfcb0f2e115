//! Inference serving
//!
//! Scores requests against the registry's current model, or a
//! deterministic heuristic when no model is loaded yet, and hands each
//! prediction off to the asynchronous log sink.

mod engine;
mod sink;

pub use engine::{InferenceEngine, Prediction};
pub use sink::PredictionLogSink;
