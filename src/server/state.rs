//! Application state shared across handlers

use crate::inference::{InferenceEngine, PredictionLogSink};
use crate::registry::ModelRegistry;
use crate::store::{ModelStore, MonitoringStore};
use std::sync::Arc;

/// Shared state handed to every request handler
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub sink: PredictionLogSink,
    pub model_store: Arc<dyn ModelStore>,
    pub monitoring_store: Arc<dyn MonitoringStore>,
    pub registry: Arc<ModelRegistry>,
}
