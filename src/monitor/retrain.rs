//! Candidate model retraining
//!
//! Trains a candidate on a fresh sample, registers it as an inactive
//! version, and raises a promotion-pending alert. Promotion itself is
//! a manual action against the store; this job never activates a
//! version.

use super::{metrics, normal_draws, MonitorJob};
use crate::alert::AlertSink;
use crate::domain::{increment_version, ModelVersion, VersionBump};
use crate::error::{Result, RiskwatchError};
use crate::model::{save_artifact, CreditModel};
use crate::store::ModelStore;
use chrono::Utc;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Labeled data handed to the training function
pub struct TrainingSample {
    /// (n_samples, 3) matrix in feature order income, debt, credit_score
    pub x: Array2<f64>,
    /// 0/1 labels
    pub y: Array1<f64>,
}

/// The opaque training function: sample in, model plus offline
/// metrics out
pub trait Trainer: Send + Sync {
    fn train(&self, sample: &TrainingSample) -> Result<(CreditModel, HashMap<String, f64>)>;
}

/// Reference trainer: fits the logistic model and reports training-set
/// accuracy and F1
pub struct SyntheticTrainer;

impl Trainer for SyntheticTrainer {
    fn train(&self, sample: &TrainingSample) -> Result<(CreditModel, HashMap<String, f64>)> {
        let model = CreditModel::fit(&sample.x, &sample.y)?;

        let pairs: Vec<(u8, u8)> = sample
            .y
            .iter()
            .enumerate()
            .map(|(i, &actual)| {
                let features = crate::domain::FeatureVector {
                    income: sample.x[[i, 0]],
                    debt: sample.x[[i, 1]],
                    credit_score: sample.x[[i, 2]],
                };
                (model.predict_class(&features), actual as u8)
            })
            .collect();

        let mut offline_metrics = HashMap::new();
        offline_metrics.insert("accuracy".to_string(), metrics::accuracy(&pairs));
        offline_metrics.insert("f1_score".to_string(), metrics::f1_score(&pairs));

        Ok((model, offline_metrics))
    }
}

/// Sampling policy standing in for recent production traffic:
/// income ~ N(55k, 20k), debt ~ N(10k, 5k), credit_score ~ N(650, 100);
/// label = 1 unless score > 600 and debt < $20k.
pub fn synthetic_sample(seed: Option<u64>) -> TrainingSample {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let n = 1000;

    let incomes = normal_draws(&mut rng, 55_000.0, 20_000.0, n);
    let debts = normal_draws(&mut rng, 10_000.0, 5_000.0, n);
    let scores = normal_draws(&mut rng, 650.0, 100.0, n);

    let mut rows = Vec::with_capacity(n * 3);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        rows.extend_from_slice(&[incomes[i], debts[i], scores[i]]);
        let no_default = scores[i] > 600.0 && debts[i] < 20_000.0;
        labels.push(if no_default { 0.0 } else { 1.0 });
    }

    TrainingSample {
        x: Array2::from_shape_vec((n, 3), rows).expect("row count matches shape"),
        y: Array1::from_vec(labels),
    }
}

/// Trains and registers candidate model versions
pub struct RetrainJob {
    model_store: Arc<dyn ModelStore>,
    trainer: Arc<dyn Trainer>,
    alert: Arc<dyn AlertSink>,
    models_dir: PathBuf,
}

impl RetrainJob {
    pub fn new(
        model_store: Arc<dyn ModelStore>,
        trainer: Arc<dyn Trainer>,
        alert: Arc<dyn AlertSink>,
        models_dir: PathBuf,
    ) -> Self {
        Self {
            model_store,
            trainer,
            alert,
            models_dir,
        }
    }

    /// Next candidate tag: patch increment of the latest known
    /// version, defaulting the latest to "v1.0.0" when the catalog is
    /// empty. A malformed stored tag falls back to "v1.0.0" with a
    /// warning instead of failing the job.
    fn next_version(&self) -> Result<String> {
        let latest = self
            .model_store
            .latest_version()?
            .unwrap_or_else(|| "v1.0.0".to_string());

        match increment_version(&latest, VersionBump::Patch) {
            Ok(next) => Ok(next),
            Err(RiskwatchError::VersionFormat(tag)) => {
                warn!(tag = %tag, "Latest version tag is malformed, falling back to v1.0.0");
                Ok("v1.0.0".to_string())
            }
            Err(e) => Err(e),
        }
    }
}

impl MonitorJob for RetrainJob {
    fn name(&self) -> &'static str {
        "retrain"
    }

    fn run(&self) -> Result<()> {
        info!("Starting candidate model training job");

        let sample = synthetic_sample(None);
        let (model, offline_metrics) = self.trainer.train(&sample)?;

        let version = self.next_version()?;
        let artifact_path = self.models_dir.join(format!("model_{version}.json"));
        save_artifact(&artifact_path, &model)?;
        info!(version = %version, path = %artifact_path.display(), "Candidate model saved");

        self.model_store.insert_version(ModelVersion {
            version: version.clone(),
            artifact_path,
            is_active: false,
            metrics: offline_metrics.clone(),
            created_at: Utc::now(),
        })?;

        let metrics_json =
            serde_json::to_string(&offline_metrics).unwrap_or_else(|_| "{}".to_string());
        let message = format!(
            "New candidate model version available\n\
             Version: {version}\n\
             Status: waiting for manual review\n\
             Metrics: {metrics_json}\n\
             Action: review, then promote by updating the active flag.",
        );
        self.alert.send(&message);

        info!(version = %version, "Candidate model training job completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::CapturingAlertSink;
    use crate::store::MemoryStore;

    fn temp_models_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("riskwatch_test_retrain_{name}"))
    }

    #[test]
    fn test_synthetic_trainer_learns_policy() {
        let sample = synthetic_sample(Some(3));
        let (model, offline_metrics) = SyntheticTrainer.train(&sample).unwrap();

        // The labeling rule is nearly linearly separable; a fitted
        // model should comfortably beat chance
        assert!(offline_metrics["accuracy"] > 0.8);
        assert!(offline_metrics.contains_key("f1_score"));

        let risky = crate::domain::FeatureVector {
            income: 40_000.0,
            debt: 30_000.0,
            credit_score: 450.0,
        };
        assert_eq!(model.predict_class(&risky), 1);
    }

    #[test]
    fn test_run_registers_inactive_candidate() {
        let dir = temp_models_dir("register");
        let store = Arc::new(MemoryStore::new());
        let alert = Arc::new(CapturingAlertSink::new());

        let job = RetrainJob::new(
            Arc::clone(&store) as Arc<dyn ModelStore>,
            Arc::new(SyntheticTrainer),
            Arc::clone(&alert) as Arc<dyn AlertSink>,
            dir.clone(),
        );
        job.run().unwrap();

        let versions = store.list_versions().unwrap();
        assert_eq!(versions.len(), 1);
        let candidate = &versions[0];
        assert_eq!(candidate.version, "v1.0.1");
        assert!(!candidate.is_active);
        assert!(candidate.artifact_path.exists());
        assert!(candidate.metrics.contains_key("accuracy"));

        // No auto-promotion: still no active version
        assert!(store.get_active_version().unwrap().is_none());

        assert_eq!(alert.count(), 1);
        assert!(alert.messages()[0].contains("v1.0.1"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_successive_runs_increment_patch() {
        let dir = temp_models_dir("increment");
        let store = Arc::new(MemoryStore::new());
        let alert = Arc::new(CapturingAlertSink::new());

        let job = RetrainJob::new(
            Arc::clone(&store) as Arc<dyn ModelStore>,
            Arc::new(SyntheticTrainer),
            alert,
            dir.clone(),
        );
        job.run().unwrap();
        job.run().unwrap();

        let mut tags: Vec<String> = store
            .list_versions()
            .unwrap()
            .into_iter()
            .map(|v| v.version)
            .collect();
        tags.sort();
        assert_eq!(tags, vec!["v1.0.1", "v1.0.2"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_latest_version_falls_back() {
        let dir = temp_models_dir("malformed");
        let store = Arc::new(MemoryStore::new());
        store
            .insert_version(ModelVersion {
                version: "bad-version".to_string(),
                artifact_path: dir.join("model_bad.json"),
                is_active: false,
                metrics: HashMap::new(),
                created_at: Utc::now(),
            })
            .unwrap();

        let job = RetrainJob::new(
            Arc::clone(&store) as Arc<dyn ModelStore>,
            Arc::new(SyntheticTrainer),
            Arc::new(CapturingAlertSink::new()),
            dir.clone(),
        );
        job.run().unwrap();

        assert!(store
            .list_versions()
            .unwrap()
            .iter()
            .any(|v| v.version == "v1.0.0"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
