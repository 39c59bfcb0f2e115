//! Inference engine implementation

use crate::domain::FeatureVector;
use crate::registry::{ModelRegistry, FALLBACK_VERSION};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Result of scoring one request
#[derive(Debug, Clone)]
pub struct Prediction {
    pub request_id: Uuid,
    /// Probability of default, in [0, 1]
    pub prob: f64,
    /// 1 if prob > 0.5, else 0
    pub class: u8,
    /// Version that produced the score, or "fallback"
    pub version_used: String,
    /// Scoring latency only
    pub latency_ms: f64,
}

/// Scores requests against the registry's current model
pub struct InferenceEngine {
    registry: Arc<ModelRegistry>,
}

impl InferenceEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Score one request. Takes a single registry snapshot so the
    /// probability and reported version always come from the same
    /// model. Never fails: with no model loaded the documented
    /// heuristic serves instead.
    pub fn predict(&self, features: &FeatureVector) -> Prediction {
        let snapshot = self.registry.get();

        let start = Instant::now();
        let (prob, version_used) = match &snapshot.model {
            Some(model) => (model.predict_proba(features), snapshot.version.clone()),
            None => (
                Self::heuristic_score(features),
                FALLBACK_VERSION.to_string(),
            ),
        };
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let prob = prob.clamp(0.0, 1.0);
        Prediction {
            request_id: Uuid::new_v4(),
            prob,
            class: if prob > 0.5 { 1 } else { 0 },
            version_used,
            latency_ms,
        }
    }

    /// Deterministic scoring used before the first model exists.
    ///
    /// Policy: higher credit score and higher income mean lower
    /// default probability. The score is normalized over the FICO
    /// range [300, 850] and weighted 70/30 against income capped at
    /// $100k.
    fn heuristic_score(features: &FeatureVector) -> f64 {
        let normalized_score = (features.credit_score - 300.0) / 550.0;
        let income_factor = (features.income / 100_000.0).min(1.0);
        (1.0 - (0.7 * normalized_score + 0.3 * income_factor)).clamp(0.0, 1.0)
    }
}
