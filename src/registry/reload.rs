//! Background model reload loop
//!
//! Polls the model store for the active version and hot-swaps the
//! registry when it changes. The artifact load happens outside the
//! registry lock, so a slow or failing load never stalls inference.

use super::ModelRegistry;
use crate::model::load_artifact;
use crate::store::ModelStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Periodic active-version poller
pub struct ReloadLoop {
    registry: Arc<ModelRegistry>,
    store: Arc<dyn ModelStore>,
    interval: Duration,
}

impl ReloadLoop {
    pub fn new(
        registry: Arc<ModelRegistry>,
        store: Arc<dyn ModelStore>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            store,
            interval,
        }
    }

    /// One reload check. Errors are contained here; a failed tick
    /// leaves the registry exactly as it was.
    pub fn tick(&self) {
        let active = match self.store.get_active_version() {
            Ok(active) => active,
            Err(e) => {
                warn!(error = %e, "Model store query failed, keeping current model");
                return;
            }
        };

        let Some(active) = active else {
            debug!("No active model version in store");
            return;
        };

        if active.version == self.registry.version() {
            return;
        }

        // Load outside the registry lock
        match load_artifact(&active.artifact_path) {
            Ok(model) => {
                self.registry.swap(model, active.version.clone());
                info!(version = %active.version, "Swapped in new active model");
            }
            Err(e) => {
                warn!(
                    version = %active.version,
                    path = %active.artifact_path.display(),
                    error = %e,
                    "Failed to load model artifact, keeping current model"
                );
            }
        }
    }

    /// Run until the shutdown channel flips to true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        info!(interval_secs = self.interval.as_secs(), "Model reload loop started");

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick(),
                changed = shutdown.changed() => {
                    // A dropped sender means the service is going away
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Model reload loop stopping");
                        return;
                    }
                }
            }
        }
    }
}

/// Spawn the reload loop on its own task
pub fn spawn_reload_loop(
    registry: Arc<ModelRegistry>,
    store: Arc<dyn ModelStore>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(ReloadLoop::new(registry, store, interval).run(shutdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelVersion;
    use crate::model::{save_artifact, CreditModel};
    use crate::registry::FALLBACK_VERSION;
    use crate::store::MemoryStore;
    use chrono::Utc;
    use ndarray::{Array1, Array2};
    use std::collections::HashMap;

    fn trained_model() -> CreditModel {
        let x = Array2::from_shape_vec(
            (4, 3),
            vec![
                30_000.0, 20_000.0, 400.0, 90_000.0, 2_000.0, 800.0, 32_000.0, 21_000.0, 420.0,
                88_000.0, 1_000.0, 810.0,
            ],
        )
        .unwrap();
        let y = Array1::from_vec(vec![1.0, 0.0, 1.0, 0.0]);
        CreditModel::fit(&x, &y).unwrap()
    }

    fn catalog_entry(tag: &str, path: std::path::PathBuf, active: bool) -> ModelVersion {
        ModelVersion {
            version: tag.to_string(),
            artifact_path: path,
            is_active: active,
            metrics: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_tick_noop_without_active_version() {
        let registry = Arc::new(ModelRegistry::new());
        let store = Arc::new(MemoryStore::new());
        let reload = ReloadLoop::new(
            Arc::clone(&registry),
            store,
            Duration::from_secs(30),
        );

        reload.tick();
        assert_eq!(registry.version(), FALLBACK_VERSION);
    }

    #[test]
    fn test_tick_swaps_in_new_version() {
        let dir = std::env::temp_dir().join("riskwatch_test_reload_swap");
        let path = dir.join("model_v1.0.0.json");
        save_artifact(&path, &trained_model()).unwrap();

        let registry = Arc::new(ModelRegistry::new());
        let store = Arc::new(MemoryStore::new());
        store
            .insert_version(catalog_entry("v1.0.0", path, true))
            .unwrap();

        let reload = ReloadLoop::new(
            Arc::clone(&registry),
            store,
            Duration::from_secs(30),
        );
        reload.tick();

        let snapshot = registry.get();
        assert_eq!(snapshot.version, "v1.0.0");
        assert!(snapshot.model.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_artifact_keeps_prior_model() {
        let dir = std::env::temp_dir().join("riskwatch_test_reload_missing");
        let good_path = dir.join("model_v1.0.0.json");
        save_artifact(&good_path, &trained_model()).unwrap();

        let registry = Arc::new(ModelRegistry::new());
        let store = Arc::new(MemoryStore::new());
        store
            .insert_version(catalog_entry("v1.0.0", good_path, true))
            .unwrap();

        let reload = ReloadLoop::new(
            Arc::clone(&registry),
            Arc::clone(&store) as Arc<dyn ModelStore>,
            Duration::from_secs(30),
        );
        reload.tick();
        assert_eq!(registry.version(), "v1.0.0");

        // Promote a version whose artifact does not exist
        store
            .insert_version(catalog_entry(
                "v1.0.1",
                dir.join("model_v1.0.1.json"),
                false,
            ))
            .unwrap();
        store.promote("v1.0.1").unwrap();

        reload.tick();

        // No partial adoption: version and model both unchanged
        let snapshot = registry.get();
        assert_eq!(snapshot.version, "v1.0.0");
        assert!(snapshot.model.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_tick_noop_when_version_unchanged() {
        let dir = std::env::temp_dir().join("riskwatch_test_reload_same");
        let path = dir.join("model_v1.0.0.json");
        save_artifact(&path, &trained_model()).unwrap();

        let registry = Arc::new(ModelRegistry::new());
        let store = Arc::new(MemoryStore::new());
        store
            .insert_version(catalog_entry("v1.0.0", path.clone(), true))
            .unwrap();

        let reload = ReloadLoop::new(
            Arc::clone(&registry),
            store,
            Duration::from_secs(30),
        );
        reload.tick();
        let first = registry.get();

        // Delete the artifact; an unchanged version must not re-read it
        let _ = std::fs::remove_dir_all(&dir);
        reload.tick();

        let second = registry.get();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
