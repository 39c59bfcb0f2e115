//! Ground-truth labeling
//!
//! Finds predictions without a label and backfills one via a
//! pluggable strategy. In production the strategy is fed by the real
//! outcome feed; the reference strategy here simulates outcomes
//! conditioned on the model's own confidence.

use super::MonitorJob;
use crate::domain::{GroundTruthRecord, PredictionRecord};
use crate::error::Result;
use crate::store::MonitoringStore;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::info;

/// Produces an outcome label for one prediction
pub trait LabelStrategy: Send + Sync {
    fn label(&self, prediction: &PredictionRecord) -> u8;
}

/// Probability-conditioned simulation (documented policy, not an
/// accuracy claim): confident predictions (prob > 0.8 or < 0.2) agree
/// with the model 90% of the time; uncertain ones are a fair coin.
pub struct SimulatedOutcomes {
    rng: Mutex<StdRng>,
}

impl SimulatedOutcomes {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for SimulatedOutcomes {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelStrategy for SimulatedOutcomes {
    fn label(&self, prediction: &PredictionRecord) -> u8 {
        let mut rng = self.rng.lock();
        let prob = prediction.prediction_prob;

        if prob > 0.8 {
            if rng.gen::<f64>() < 0.9 {
                1
            } else {
                0
            }
        } else if prob < 0.2 {
            if rng.gen::<f64>() < 0.9 {
                0
            } else {
                1
            }
        } else if rng.gen::<f64>() < 0.5 {
            1
        } else {
            0
        }
    }
}

/// Backfills ground-truth labels for unlabeled predictions
pub struct GroundTruthLabeler {
    store: Arc<dyn MonitoringStore>,
    strategy: Box<dyn LabelStrategy>,
}

impl GroundTruthLabeler {
    pub fn new(store: Arc<dyn MonitoringStore>, strategy: Box<dyn LabelStrategy>) -> Self {
        Self { store, strategy }
    }
}

impl MonitorJob for GroundTruthLabeler {
    fn name(&self) -> &'static str {
        "ground_truth_labeler"
    }

    /// Idempotent: only predictions without an existing label are
    /// fetched, so re-running with no new traffic inserts nothing.
    fn run(&self) -> Result<()> {
        let unlabeled = self.store.unlabeled_predictions()?;
        if unlabeled.is_empty() {
            info!("No new predictions to label");
            return Ok(());
        }

        let labels: Vec<GroundTruthRecord> = unlabeled
            .iter()
            .map(|p| GroundTruthRecord {
                request_id: p.request_id,
                actual_class: self.strategy.label(p),
            })
            .collect();

        self.store.append_labels(&labels)?;
        info!(count = labels.len(), "Added ground-truth labels");
        Ok(())
    }
}
