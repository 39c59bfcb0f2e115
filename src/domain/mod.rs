//! Core domain types
//!
//! Record types shared by the serving path and the monitoring jobs,
//! plus semantic version tag handling for model versions.

mod version;

pub use version::{increment_version, parse_version, VersionBump};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Input features for the credit-risk model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Annual income of the applicant
    pub income: f64,
    /// Total current debt
    pub debt: f64,
    /// FICO credit score (300-850)
    pub credit_score: f64,
}

/// A catalog entry for one trained model version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    /// Semantic tag, e.g. "v1.0.2"
    pub version: String,
    /// Location of the serialized artifact
    pub artifact_path: PathBuf,
    /// Whether this version is authorized to serve traffic.
    /// At most one version is active at a time; the store enforces it.
    pub is_active: bool,
    /// Offline metrics recorded at training time
    pub metrics: HashMap<String, f64>,
    /// When this version was registered
    pub created_at: DateTime<Utc>,
}

/// One served prediction, logged for monitoring. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub request_id: Uuid,
    pub model_version: String,
    pub features: FeatureVector,
    /// Probability of default, in [0, 1]
    pub prediction_prob: f64,
    /// 1 = predicted default, 0 = predicted no default
    pub prediction_class: u8,
    /// Scoring latency only; logging is excluded
    pub latency_ms: f64,
    pub timestamp: DateTime<Utc>,
}

/// Delayed true outcome for a served prediction. At most one per request_id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    pub request_id: Uuid,
    pub actual_class: u8,
}

/// One point in the append-only metrics time series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRecord {
    pub metric_name: String,
    pub metric_value: f64,
    pub model_version: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl MetricRecord {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        model_version: impl Into<String>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Self {
        Self {
            metric_name: name.into(),
            metric_value: value,
            model_version: model_version.into(),
            window_start,
            window_end,
        }
    }
}
