//! Rolling performance metrics
//!
//! Joins predictions with ground truth over a trailing window and
//! appends accuracy and F1 to the metrics time series. Overlapping
//! windows are treated as independent re-samples; rows are never
//! deduplicated against earlier windows.

use super::MonitorJob;
use crate::domain::MetricRecord;
use crate::error::Result;
use crate::registry::ModelRegistry;
use crate::store::MonitoringStore;
use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Fraction of pairs where predicted class equals actual class
pub fn accuracy(pairs: &[(u8, u8)]) -> f64 {
    if pairs.is_empty() {
        return 0.0;
    }
    let correct = pairs.iter().filter(|(pred, actual)| pred == actual).count();
    correct as f64 / pairs.len() as f64
}

/// Binary F1 with class 1 (default) as the positive class.
/// Zero-denominator cases report 0.0.
pub fn f1_score(pairs: &[(u8, u8)]) -> f64 {
    let tp = pairs.iter().filter(|&&(p, a)| p == 1 && a == 1).count() as f64;
    let fp = pairs.iter().filter(|&&(p, a)| p == 1 && a == 0).count() as f64;
    let fn_ = pairs.iter().filter(|&&(p, a)| p == 0 && a == 1).count() as f64;

    let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
    let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };

    if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    }
}

/// Computes accuracy/F1 over the trailing window and persists them
pub struct MetricsJob {
    store: Arc<dyn MonitoringStore>,
    registry: Arc<ModelRegistry>,
    window_days: i64,
}

impl MetricsJob {
    pub fn new(store: Arc<dyn MonitoringStore>, registry: Arc<ModelRegistry>) -> Self {
        Self {
            store,
            registry,
            window_days: 7,
        }
    }

    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days;
        self
    }
}

impl MonitorJob for MetricsJob {
    fn name(&self) -> &'static str {
        "metrics"
    }

    fn run(&self) -> Result<()> {
        let window_end = Utc::now();
        let window_start = window_end - ChronoDuration::days(self.window_days);

        let pairs = self.store.joined_outcomes(window_start)?;
        if pairs.is_empty() {
            warn!("No labeled predictions in window, skipping metric computation");
            return Ok(());
        }

        let acc = accuracy(&pairs);
        let f1 = f1_score(&pairs);
        let version = self.registry.version();

        info!(
            samples = pairs.len(),
            accuracy = acc,
            f1_score = f1,
            "Computed rolling metrics"
        );

        self.store.append_metric(MetricRecord::new(
            "accuracy",
            acc,
            version.clone(),
            window_start,
            window_end,
        ))?;
        self.store.append_metric(MetricRecord::new(
            "f1_score",
            f1,
            version,
            window_start,
            window_end,
        ))?;

        Ok(())
    }
}
