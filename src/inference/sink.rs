//! Asynchronous prediction log sink
//!
//! The request path enqueues and returns; a background worker owns
//! the store write. A failed write is logged and dropped — losing a
//! log row is acceptable, stalling a response is not.

use crate::domain::PredictionRecord;
use crate::store::MonitoringStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Fire-and-forget handle for logging predictions
#[derive(Clone)]
pub struct PredictionLogSink {
    tx: mpsc::UnboundedSender<PredictionRecord>,
}

impl PredictionLogSink {
    /// Spawn the sink worker and return the sending handle
    pub fn spawn(store: Arc<dyn MonitoringStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PredictionRecord>();

        tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                if let Err(e) = store.append_prediction(record) {
                    warn!(error = %e, "Failed to persist prediction log entry, dropping");
                }
            }
            debug!("Prediction log sink drained and closed");
        });

        Self { tx }
    }

    /// Enqueue one record. Never blocks; if the worker is gone the
    /// entry is dropped with a warning.
    pub fn record(&self, record: PredictionRecord) {
        if self.tx.send(record).is_err() {
            warn!("Prediction log sink is closed, dropping entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureVector;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn record() -> PredictionRecord {
        PredictionRecord {
            request_id: Uuid::new_v4(),
            model_version: "v1.0.0".to_string(),
            features: FeatureVector {
                income: 55_000.0,
                debt: 10_000.0,
                credit_score: 650.0,
            },
            prediction_prob: 0.3,
            prediction_class: 0,
            latency_ms: 0.2,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sink_persists_records() {
        let store = Arc::new(MemoryStore::new());
        let sink = PredictionLogSink::spawn(Arc::clone(&store) as Arc<dyn MonitoringStore>);

        for _ in 0..10 {
            sink.record(record());
        }

        // Give the worker a moment to drain
        for _ in 0..50 {
            if store.prediction_count() == 10 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(store.prediction_count(), 10);
    }

    #[tokio::test]
    async fn test_record_does_not_fail_caller() {
        let store = Arc::new(MemoryStore::new());
        let sink = PredictionLogSink::spawn(store);

        // record() returns immediately regardless of worker state
        sink.record(record());
    }
}
