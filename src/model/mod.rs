//! Credit-risk model and artifact handling
//!
//! The served model is a logistic classifier over standardized
//! features. Everything outside this module and the trainer treats it
//! as an opaque, serializable handle.

mod artifact;

pub use artifact::{load_artifact, save_artifact};

use crate::domain::FeatureVector;
use crate::error::{Result, RiskwatchError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// A trained binary classifier for default risk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditModel {
    /// Coefficients in feature order: income, debt, credit_score
    weights: Array1<f64>,
    intercept: f64,
    /// Per-feature standardization learned at fit time
    feature_means: Array1<f64>,
    feature_stds: Array1<f64>,
}

/// Number of input features the model expects
pub const N_FEATURES: usize = 3;

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl CreditModel {
    /// Fit by gradient descent on the logistic loss.
    ///
    /// `x` is (n_samples, 3) in feature order income, debt,
    /// credit_score; `y` holds 0/1 labels.
    pub fn fit(x: &Array2<f64>, y: &Array1<f64>) -> Result<Self> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(RiskwatchError::InsufficientData {
                needed: 1,
                got: 0,
            });
        }
        if x.ncols() != N_FEATURES {
            return Err(RiskwatchError::Validation(format!(
                "expected {} feature columns, got {}",
                N_FEATURES,
                x.ncols()
            )));
        }
        if y.len() != n_samples {
            return Err(RiskwatchError::Validation(format!(
                "label length {} does not match {} samples",
                y.len(),
                n_samples
            )));
        }

        // Standardize so one learning rate works for dollar-scale and
        // score-scale features alike
        let means = x.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(N_FEATURES));
        let stds = x.std_axis(Axis(0), 0.0).mapv(|s| if s > 1e-12 { s } else { 1.0 });
        let x_norm = (x - &means) / &stds;

        let mut weights = Array1::<f64>::zeros(N_FEATURES);
        let mut intercept = 0.0_f64;
        let learning_rate = 0.1;
        let max_iter = 500;
        let n = n_samples as f64;

        for _ in 0..max_iter {
            let z = x_norm.dot(&weights) + intercept;
            let probs = z.mapv(sigmoid);
            let errors = &probs - y;

            let grad_w = x_norm.t().dot(&errors) / n;
            let grad_b = errors.sum() / n;

            weights -= &(grad_w * learning_rate);
            intercept -= grad_b * learning_rate;
        }

        Ok(Self {
            weights,
            intercept,
            feature_means: means,
            feature_stds: stds,
        })
    }

    /// Probability of default for one applicant, clamped to [0, 1]
    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let raw = [features.income, features.debt, features.credit_score];

        let z: f64 = raw
            .iter()
            .enumerate()
            .map(|(i, &v)| self.weights[i] * (v - self.feature_means[i]) / self.feature_stds[i])
            .sum::<f64>()
            + self.intercept;

        sigmoid(z).clamp(0.0, 1.0)
    }

    /// Hard class at the 0.5 decision boundary
    pub fn predict_class(&self, features: &FeatureVector) -> u8 {
        if self.predict_proba(features) > 0.5 {
            1
        } else {
            0
        }
    }
}
