//! In-memory store implementation
//!
//! Backs local runs and tests. All collections live under one lock;
//! none of the queries here are on the request hot path except the
//! prediction append, which is a single push.

use super::{ModelStore, MonitoringStore};
use crate::domain::{
    FeatureVector, GroundTruthRecord, MetricRecord, ModelVersion, PredictionRecord,
};
use crate::error::{Result, RiskwatchError};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct StoreInner {
    predictions: Vec<PredictionRecord>,
    labels: HashMap<Uuid, u8>,
    metrics: Vec<MetricRecord>,
    versions: Vec<ModelVersion>,
}

/// Thread-safe in-memory store
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the active flag to `version`, clearing it everywhere else.
    ///
    /// This models the manual promotion action an operator performs
    /// against the production store; it is intentionally not part of
    /// the [`ModelStore`] trait the core consumes.
    pub fn promote(&self, version: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.versions.iter().any(|v| v.version == version) {
            return Err(RiskwatchError::Store(format!(
                "cannot promote unknown version {version}"
            )));
        }
        for v in inner.versions.iter_mut() {
            v.is_active = v.version == version;
        }
        Ok(())
    }

    /// Total number of logged predictions
    pub fn prediction_count(&self) -> usize {
        self.inner.read().predictions.len()
    }

    /// Total number of ground-truth labels
    pub fn label_count(&self) -> usize {
        self.inner.read().labels.len()
    }
}

impl ModelStore for MemoryStore {
    fn get_active_version(&self) -> Result<Option<ModelVersion>> {
        let inner = self.inner.read();
        Ok(inner.versions.iter().find(|v| v.is_active).cloned())
    }

    fn insert_version(&self, version: ModelVersion) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.versions.iter().any(|v| v.version == version.version) {
            return Err(RiskwatchError::Store(format!(
                "version {} already registered",
                version.version
            )));
        }
        inner.versions.push(version);
        Ok(())
    }

    fn latest_version(&self) -> Result<Option<String>> {
        let inner = self.inner.read();
        Ok(inner
            .versions
            .iter()
            .max_by_key(|v| v.created_at)
            .map(|v| v.version.clone()))
    }

    fn list_versions(&self) -> Result<Vec<ModelVersion>> {
        let inner = self.inner.read();
        let mut versions = inner.versions.clone();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(versions)
    }
}

impl MonitoringStore for MemoryStore {
    fn append_prediction(&self, record: PredictionRecord) -> Result<()> {
        self.inner.write().predictions.push(record);
        Ok(())
    }

    fn unlabeled_predictions(&self) -> Result<Vec<PredictionRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .predictions
            .iter()
            .filter(|p| !inner.labels.contains_key(&p.request_id))
            .cloned()
            .collect())
    }

    fn append_labels(&self, labels: &[GroundTruthRecord]) -> Result<()> {
        let mut inner = self.inner.write();
        for label in labels {
            // First label for a request_id wins; re-labeling is a no-op
            inner
                .labels
                .entry(label.request_id)
                .or_insert(label.actual_class);
        }
        Ok(())
    }

    fn joined_outcomes(&self, since: DateTime<Utc>) -> Result<Vec<(u8, u8)>> {
        let inner = self.inner.read();
        Ok(inner
            .predictions
            .iter()
            .filter(|p| p.timestamp >= since)
            .filter_map(|p| {
                inner
                    .labels
                    .get(&p.request_id)
                    .map(|&actual| (p.prediction_class, actual))
            })
            .collect())
    }

    fn recent_features(&self, limit: usize) -> Result<Vec<FeatureVector>> {
        let inner = self.inner.read();
        Ok(inner
            .predictions
            .iter()
            .rev()
            .take(limit)
            .map(|p| p.features)
            .collect())
    }

    fn append_metric(&self, record: MetricRecord) -> Result<()> {
        self.inner.write().metrics.push(record);
        Ok(())
    }

    fn recent_metrics(&self, limit: usize) -> Result<Vec<MetricRecord>> {
        let inner = self.inner.read();
        Ok(inner.metrics.iter().rev().take(limit).cloned().collect())
    }
}
