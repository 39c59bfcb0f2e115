//! Semantic version tags for model versions
//!
//! Tags follow `v<major>.<minor>.<patch>`. The retrain job increments
//! the patch field to name each new candidate.

use crate::error::{Result, RiskwatchError};

/// Which field of a version tag to increment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

/// Parse a `v<major>.<minor>.<patch>` tag into its numeric fields
pub fn parse_version(tag: &str) -> Result<(u64, u64, u64)> {
    let rest = tag
        .strip_prefix('v')
        .ok_or_else(|| RiskwatchError::VersionFormat(tag.to_string()))?;

    let mut fields = rest.split('.');
    let mut next = || -> Result<u64> {
        fields
            .next()
            .and_then(|f| f.parse().ok())
            .ok_or_else(|| RiskwatchError::VersionFormat(tag.to_string()))
    };

    let (major, minor, patch) = (next()?, next()?, next()?);
    if rest.split('.').count() != 3 {
        return Err(RiskwatchError::VersionFormat(tag.to_string()));
    }
    Ok((major, minor, patch))
}

/// Increment one field of a version tag, resetting the lower fields
pub fn increment_version(tag: &str, bump: VersionBump) -> Result<String> {
    let (major, minor, patch) = parse_version(tag)?;

    let next = match bump {
        VersionBump::Major => (major + 1, 0, 0),
        VersionBump::Minor => (major, minor + 1, 0),
        VersionBump::Patch => (major, minor, patch + 1),
    };

    Ok(format!("v{}.{}.{}", next.0, next.1, next.2))
}
