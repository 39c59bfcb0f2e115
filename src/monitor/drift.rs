//! Input drift detection
//!
//! Two-sample Kolmogorov-Smirnov test comparing the recent income
//! distribution against a fixed training-time reference. The p-value
//! is persisted as a metric row and drops below the threshold raise
//! an alert.

use super::{normal_draws, MonitorJob};
use crate::alert::AlertSink;
use crate::domain::MetricRecord;
use crate::error::Result;
use crate::registry::ModelRegistry;
use crate::store::MonitoringStore;
use chrono::{Duration as ChronoDuration, Utc};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Metric name under which the p-value is persisted
pub const DRIFT_METRIC: &str = "drift_income_p_value";

/// Two-sample KS statistic: the maximum absolute difference between
/// the empirical CDFs of the two samples
pub fn ks_statistic(reference: &[f64], live: &[f64]) -> f64 {
    let mut ref_sorted = reference.to_vec();
    let mut live_sorted = live.to_vec();
    ref_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    live_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let ecdf = |sorted: &[f64], x: f64| -> f64 {
        let count = sorted.partition_point(|&v| v <= x);
        count as f64 / sorted.len() as f64
    };

    let mut combined: Vec<f64> = ref_sorted.iter().chain(live_sorted.iter()).copied().collect();
    combined.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    combined.dedup();

    combined
        .iter()
        .map(|&x| (ecdf(&ref_sorted, x) - ecdf(&live_sorted, x)).abs())
        .fold(0.0, f64::max)
}

/// Survival function of the Kolmogorov distribution,
/// Q(lambda) = 2 * sum_{j>=1} (-1)^(j-1) exp(-2 j^2 lambda^2)
fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for j in 1..=100 {
        let term = (-2.0 * (j as f64).powi(2) * lambda.powi(2)).exp();
        sum += sign * term;
        sign = -sign;
        if term < 1e-12 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Two-sample KS test, returning (statistic, asymptotic p-value).
/// Uses the small-sample correction
/// lambda = (sqrt(n_e) + 0.12 + 0.11/sqrt(n_e)) * D with
/// n_e = n1*n2/(n1+n2).
pub fn ks_2samp(reference: &[f64], live: &[f64]) -> (f64, f64) {
    let d = ks_statistic(reference, live);
    let n1 = reference.len() as f64;
    let n2 = live.len() as f64;
    let en = (n1 * n2 / (n1 + n2)).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * d;
    (d, kolmogorov_sf(lambda))
}

/// Fixed training-time income sample held in memory for the lifetime
/// of the monitoring process. Assumption carried over from training:
/// mean income $55k, std $15k.
pub fn income_baseline(seed: u64) -> Array1<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array1::from_vec(normal_draws(&mut rng, 55_000.0, 15_000.0, 1000))
}

/// Periodic drift check on the income feature
pub struct DriftJob {
    store: Arc<dyn MonitoringStore>,
    registry: Arc<ModelRegistry>,
    alert: Arc<dyn AlertSink>,
    reference: Array1<f64>,
    sample_size: usize,
    min_samples: usize,
    p_value_threshold: f64,
}

impl DriftJob {
    pub fn new(
        store: Arc<dyn MonitoringStore>,
        registry: Arc<ModelRegistry>,
        alert: Arc<dyn AlertSink>,
        reference: Array1<f64>,
    ) -> Self {
        Self {
            store,
            registry,
            alert,
            reference,
            sample_size: 100,
            min_samples: 50,
            p_value_threshold: 0.05,
        }
    }

    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.p_value_threshold = threshold;
        self
    }
}

impl MonitorJob for DriftJob {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn run(&self) -> Result<()> {
        let features = self.store.recent_features(self.sample_size)?;

        // Skip malformed rows rather than aborting the batch
        let live: Vec<f64> = features
            .iter()
            .map(|f| f.income)
            .filter(|v| v.is_finite())
            .collect();

        if live.len() < self.min_samples {
            info!(
                got = live.len(),
                needed = self.min_samples,
                "Not enough data to run drift detection"
            );
            return Ok(());
        }

        let (statistic, p_value) = ks_2samp(self.reference.as_slice().unwrap_or(&[]), &live);
        info!(statistic, p_value, "Drift check (income)");

        let window_end = Utc::now();
        let window_start = window_end - ChronoDuration::hours(1);
        self.store.append_metric(MetricRecord::new(
            DRIFT_METRIC,
            p_value,
            self.registry.version(),
            window_start,
            window_end,
        ))?;

        if p_value < self.p_value_threshold {
            warn!(p_value, threshold = self.p_value_threshold, "Significant input drift detected");
            let message = format!(
                "Significant data drift detected\n\
                 Feature: income\n\
                 KS statistic: {statistic:.5}\n\
                 P-value: {p_value:.5} (threshold: {})\n\
                 Status: applicants differ significantly from training data.\n\
                 Action: check for model degradation.",
                self.p_value_threshold
            );
            self.alert.send(&message);
        }

        Ok(())
    }
}
