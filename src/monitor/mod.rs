//! Scheduled monitoring pipeline
//!
//! Labeling, metric computation, drift detection, and retraining run
//! as independent periodic jobs. Each job owns its interval and its
//! failure domain: a panic or error in one tick is contained at the
//! job boundary and never reaches the scheduler or another job.

pub mod drift;
pub mod labeler;
pub mod metrics;
pub mod retrain;

pub use drift::DriftJob;
pub use labeler::{GroundTruthLabeler, LabelStrategy, SimulatedOutcomes};
pub use metrics::MetricsJob;
pub use retrain::{RetrainJob, SyntheticTrainer, Trainer, TrainingSample};

use crate::error::Result;
use rand::Rng;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A periodic monitoring job
pub trait MonitorJob: Send + Sync {
    fn name(&self) -> &'static str;

    /// One tick of work. Insufficient-data conditions are handled
    /// (and logged) inside the job and return `Ok`; an `Err` is a
    /// genuine failure for this tick.
    fn run(&self) -> Result<()>;
}

/// Runs each registered job on its own fixed interval
#[derive(Default)]
pub struct Scheduler {
    jobs: Vec<(Arc<dyn MonitorJob>, Duration)>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_job(&mut self, job: Arc<dyn MonitorJob>, every: Duration) -> &mut Self {
        self.jobs.push((job, every));
        self
    }

    /// Spawn one task per job. Ticks that would overlap a still
    /// running previous tick are skipped, not queued.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        self.jobs
            .into_iter()
            .map(|(job, every)| tokio::spawn(run_job_loop(job, every, shutdown.clone())))
            .collect()
    }
}

async fn run_job_loop(
    job: Arc<dyn MonitorJob>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // First tick fires immediately; skip it so jobs start after one
    // full interval, matching the polling schedulers they replace
    ticker.tick().await;

    let in_flight = Arc::new(AtomicBool::new(false));
    info!(job = job.name(), interval_secs = every.as_secs(), "Scheduled job");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if in_flight.swap(true, Ordering::SeqCst) {
                    warn!(job = job.name(), "Previous tick still running, skipping");
                    continue;
                }

                let job = Arc::clone(&job);
                let flag = Arc::clone(&in_flight);
                tokio::task::spawn_blocking(move || {
                    let outcome = catch_unwind(AssertUnwindSafe(|| job.run()));
                    match outcome {
                        Ok(Ok(())) => debug!(job = job.name(), "Job tick completed"),
                        Ok(Err(e)) => error!(job = job.name(), error = %e, "Job tick failed"),
                        Err(_) => error!(job = job.name(), "Job tick panicked"),
                    }
                    flag.store(false, Ordering::SeqCst);
                });
            }
            changed = shutdown.changed() => {
                // A dropped sender means the service is going away
                if changed.is_err() || *shutdown.borrow() {
                    info!(job = job.name(), "Job loop stopping");
                    return;
                }
            }
        }
    }
}

/// Draw `n` samples from Normal(mean, std) via Box-Muller
pub(crate) fn normal_draws(rng: &mut impl Rng, mean: f64, std: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| {
            let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
            let u2: f64 = rng.gen();
            let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            mean + std * z
        })
        .collect()
}
