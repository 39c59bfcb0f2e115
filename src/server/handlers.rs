//! Request handlers

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::domain::{FeatureVector, PredictionRecord};
use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Credit-risk prediction request
#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    /// Annual income; must be positive
    pub income: f64,
    /// Total current debt; must be non-negative
    pub debt: f64,
    /// FICO credit score; must be within [300, 850]
    pub credit_score: f64,
}

impl PredictionRequest {
    fn validate(&self) -> Result<FeatureVector> {
        if !(self.income > 0.0) {
            return Err(ServerError::BadRequest(
                "income must be greater than 0".to_string(),
            ));
        }
        if !(self.debt >= 0.0) {
            return Err(ServerError::BadRequest(
                "debt must be non-negative".to_string(),
            ));
        }
        if !(300.0..=850.0).contains(&self.credit_score) {
            return Err(ServerError::BadRequest(
                "credit_score must be between 300 and 850".to_string(),
            ));
        }
        Ok(FeatureVector {
            income: self.income,
            debt: self.debt,
            credit_score: self.credit_score,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub prediction_prob: f64,
    pub prediction_class: u8,
    pub model_version: String,
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Score one applicant. The response returns as soon as scoring is
/// done; the log write rides the sink in the background.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>> {
    let features = request.validate()?;
    let prediction = state.engine.predict(&features);

    state.sink.record(PredictionRecord {
        request_id: prediction.request_id,
        model_version: prediction.version_used.clone(),
        features,
        prediction_prob: prediction.prob,
        prediction_class: prediction.class,
        latency_ms: prediction.latency_ms,
        timestamp: Utc::now(),
    });

    Ok(Json(PredictionResponse {
        request_id: prediction.request_id,
        prediction_prob: prediction.prob,
        prediction_class: prediction.class,
        model_version: prediction.version_used,
    }))
}

/// Registered model versions, newest first, plus the serving version
pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let versions = state.model_store.list_versions()?;
    Ok(Json(json!({
        "serving_version": state.registry.version(),
        "models": versions,
    })))
}

/// Most recent metric rows, newest first
pub async fn recent_metrics(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let metrics = state.monitoring_store.recent_metrics(100)?;
    Ok(Json(json!({ "metrics": metrics })))
}
