//! Persistence interfaces
//!
//! The production store is an external SQL database; this crate only
//! consumes it through the traits below. [`MemoryStore`] backs the
//! default wiring and the test suite.
//!
//! All inserts are append-only. Metric rows are never updated or
//! deleted here.

mod memory;

pub use memory::MemoryStore;

use crate::domain::{GroundTruthRecord, MetricRecord, ModelVersion, PredictionRecord};
use crate::error::Result;
use chrono::{DateTime, Utc};

/// Catalog of trained model versions
pub trait ModelStore: Send + Sync {
    /// The version currently flagged active, if any. The store
    /// guarantees at most one.
    fn get_active_version(&self) -> Result<Option<ModelVersion>>;

    /// Register a new version. Never flips the active flag of an
    /// existing version.
    fn insert_version(&self, version: ModelVersion) -> Result<()>;

    /// Tag of the most recently registered version, active or not
    fn latest_version(&self) -> Result<Option<String>>;

    /// All registered versions, newest first
    fn list_versions(&self) -> Result<Vec<ModelVersion>>;
}

/// Prediction log, ground-truth labels, and the metrics time series
pub trait MonitoringStore: Send + Sync {
    fn append_prediction(&self, record: PredictionRecord) -> Result<()>;

    /// Predictions with no matching ground-truth record
    /// (left anti-join on request_id)
    fn unlabeled_predictions(&self) -> Result<Vec<PredictionRecord>>;

    /// Bulk-append ground-truth labels
    fn append_labels(&self, labels: &[GroundTruthRecord]) -> Result<()>;

    /// (predicted, actual) class pairs for predictions made at or
    /// after `since`
    fn joined_outcomes(&self, since: DateTime<Utc>) -> Result<Vec<(u8, u8)>>;

    /// Feature vectors of the `limit` most recent predictions,
    /// newest first
    fn recent_features(&self, limit: usize) -> Result<Vec<crate::domain::FeatureVector>>;

    fn append_metric(&self, record: MetricRecord) -> Result<()>;

    /// The `limit` most recent metric rows, newest first
    fn recent_metrics(&self, limit: usize) -> Result<Vec<MetricRecord>>;
}
