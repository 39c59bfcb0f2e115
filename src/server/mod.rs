//! HTTP service wiring
//!
//! Thin axum surface over the inference engine plus the background
//! machinery: the model reload loop and the monitoring scheduler are
//! spawned here and stopped through one shared shutdown channel.

mod api;
mod error;
mod handlers;
mod state;

pub use api::create_router;
pub use error::ServerError;
pub use state::AppState;

use crate::alert::LogAlertSink;
use crate::inference::{InferenceEngine, PredictionLogSink};
use crate::monitor::{
    drift::income_baseline, DriftJob, GroundTruthLabeler, MetricsJob, RetrainJob, Scheduler,
    SimulatedOutcomes, SyntheticTrainer,
};
use crate::registry::{spawn_reload_loop, ModelRegistry};
use crate::store::MemoryStore;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Service configuration, overridable via environment
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: String,
    pub reload_interval_secs: u64,
    pub labeler_interval_secs: u64,
    pub metrics_interval_secs: u64,
    pub drift_interval_secs: u64,
    /// None disables the scheduled retrain job
    pub retrain_interval_secs: Option<u64>,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_parse("API_PORT", 8080),
            models_dir: std::env::var("MODELS_DIR").unwrap_or_else(|_| "./models".to_string()),
            reload_interval_secs: env_parse("RELOAD_INTERVAL_SECS", 30),
            labeler_interval_secs: env_parse("LABELER_INTERVAL_SECS", 30),
            metrics_interval_secs: env_parse("METRICS_INTERVAL_SECS", 30),
            drift_interval_secs: env_parse("DRIFT_INTERVAL_SECS", 60),
            retrain_interval_secs: std::env::var("RETRAIN_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

/// Start the service: HTTP listener, reload loop, and scheduler.
/// Runs until ctrl+c, then stops the background loops through the
/// shutdown channel.
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.models_dir)?;

    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(ModelRegistry::new());
    let alert = Arc::new(LogAlertSink);

    let engine = Arc::new(InferenceEngine::new(Arc::clone(&registry)));
    let sink = PredictionLogSink::spawn(Arc::clone(&store) as _);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    spawn_reload_loop(
        Arc::clone(&registry),
        Arc::clone(&store) as _,
        Duration::from_secs(config.reload_interval_secs),
        shutdown_rx.clone(),
    );

    let mut scheduler = Scheduler::new();
    scheduler
        .add_job(
            Arc::new(GroundTruthLabeler::new(
                Arc::clone(&store) as _,
                Box::new(SimulatedOutcomes::new()),
            )),
            Duration::from_secs(config.labeler_interval_secs),
        )
        .add_job(
            Arc::new(MetricsJob::new(
                Arc::clone(&store) as _,
                Arc::clone(&registry),
            )),
            Duration::from_secs(config.metrics_interval_secs),
        )
        .add_job(
            Arc::new(DriftJob::new(
                Arc::clone(&store) as _,
                Arc::clone(&registry),
                Arc::clone(&alert) as _,
                income_baseline(0),
            )),
            Duration::from_secs(config.drift_interval_secs),
        );
    if let Some(retrain_secs) = config.retrain_interval_secs {
        scheduler.add_job(
            Arc::new(RetrainJob::new(
                Arc::clone(&store) as _,
                Arc::new(SyntheticTrainer),
                Arc::clone(&alert) as _,
                config.models_dir.clone().into(),
            )),
            Duration::from_secs(retrain_secs),
        );
    }
    scheduler.spawn(shutdown_rx);

    let state = Arc::new(AppState {
        engine,
        sink,
        model_store: Arc::clone(&store) as _,
        monitoring_store: store,
        registry,
    });
    let app = create_router(Arc::clone(&state));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "riskwatch service listening");

    let shutdown_signal = async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Shutdown signal received, stopping background loops");
        let _ = shutdown_tx.send(true);
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Service shut down cleanly");
    Ok(())
}
