//! In-process model registry
//!
//! Holds the currently served model and its version tag as one
//! atomically swapped pair. Readers take an `Arc` snapshot; the lock
//! is held only for the pointer read or replace, never while loading
//! an artifact or scoring.

mod reload;

pub use reload::{spawn_reload_loop, ReloadLoop};

use crate::model::CreditModel;
use parking_lot::RwLock;
use std::sync::Arc;

/// Version tag reported when no model is loaded and the heuristic
/// fallback serves the request
pub const FALLBACK_VERSION: &str = "fallback";

/// The (model, version) pair served to inference. Internally
/// consistent by construction: both fields are written together.
#[derive(Debug, Clone)]
pub struct ActiveModel {
    pub model: Option<Arc<CreditModel>>,
    pub version: String,
}

impl ActiveModel {
    fn empty() -> Self {
        Self {
            model: None,
            version: FALLBACK_VERSION.to_string(),
        }
    }
}

/// Concurrent-safe holder of the active model
pub struct ModelRegistry {
    current: RwLock<Arc<ActiveModel>>,
}

impl ModelRegistry {
    /// Start with no model; inference serves the fallback heuristic
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(ActiveModel::empty())),
        }
    }

    /// Snapshot of the current pair. Never torn: the returned `Arc`
    /// points at a pair written by a single prior `swap`.
    pub fn get(&self) -> Arc<ActiveModel> {
        Arc::clone(&self.current.read())
    }

    /// Version tag of the current pair
    pub fn version(&self) -> String {
        self.current.read().version.clone()
    }

    /// Atomically replace both the model and its version
    pub fn swap(&self, model: CreditModel, version: impl Into<String>) {
        let next = Arc::new(ActiveModel {
            model: Some(Arc::new(model)),
            version: version.into(),
        });
        *self.current.write() = next;
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
