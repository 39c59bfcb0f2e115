//! Model artifact serialization
//!
//! Artifacts are whole-file JSON, written once at train time and read
//! once per reload. A missing file is reported distinctly from a
//! corrupt one so the reload loop can log it as a skip rather than a
//! parse failure.

use super::CreditModel;
use crate::error::{Result, RiskwatchError};
use std::path::Path;

/// Serialize a model to `path`, creating parent directories as needed
pub fn save_artifact(path: &Path, model: &CreditModel) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(model)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Deserialize a model from `path`
pub fn load_artifact(path: &Path) -> Result<CreditModel> {
    if !path.exists() {
        return Err(RiskwatchError::ArtifactNotFound(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path)?;
    let model = serde_json::from_str(&json)?;
    Ok(model)
}
