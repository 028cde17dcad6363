//! Fusion configuration.
//!
//! Every field has a default, so an empty YAML document is a valid config:
//!
//! ```yaml
//! alignment:
//!   variance_threshold: 2.0
//!   max_iterations: 200
//! combiner: linear
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::alignment::kabsch::DEFAULT_MAX_ITERATIONS;
use crate::error::{FusionError, Result};

/// Default maximum per-landmark distance accepted as aligned.
pub const DEFAULT_VARIANCE_THRESHOLD: f64 = 2.0;

/// How device frames are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinerKind {
    /// Joint-wise mean of palm-local positions.
    #[default]
    Linear,
    /// Orientation-aware interpolation. Reserved, not implemented.
    Angular,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Maximum per-landmark distance for the devices to count as aligned.
    pub variance_threshold: f64,
    /// Iteration cap for the rigid solver.
    pub max_iterations: usize,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            variance_threshold: DEFAULT_VARIANCE_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub alignment: AlignmentConfig,
    pub combiner: CombinerKind,
}

impl FusionConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| FusionError::InvalidConfig(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.alignment.variance_threshold)?;
        if self.alignment.max_iterations == 0 {
            return Err(FusionError::InvalidConfig(
                "alignment.max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(FusionError::InvalidConfig(format!(
            "alignment.variance_threshold must be a non-negative number, got {threshold}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FusionConfig::default();
        assert_eq!(config.alignment.variance_threshold, 2.0);
        assert_eq!(config.alignment.max_iterations, 200);
        assert_eq!(config.combiner, CombinerKind::Linear);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(FusionConfig::from_yaml_str("").unwrap(), FusionConfig::default());
    }

    #[test]
    fn test_partial_yaml() {
        let config = FusionConfig::from_yaml_str("alignment:\n  variance_threshold: 0.5\n").unwrap();
        assert_eq!(config.alignment.variance_threshold, 0.5);
        assert_eq!(config.alignment.max_iterations, 200);

        let config = FusionConfig::from_yaml_str("combiner: angular\n").unwrap();
        assert_eq!(config.combiner, CombinerKind::Angular);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            FusionConfig::from_yaml_str("alignment:\n  variance_threshold: -1.0\n"),
            Err(FusionError::InvalidConfig(_))
        ));
        assert!(matches!(
            FusionConfig::from_yaml_str("alignment:\n  max_iterations: 0\n"),
            Err(FusionError::InvalidConfig(_))
        ));
        assert!(matches!(
            FusionConfig::from_yaml_str("combiner: spline\n"),
            Err(FusionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fusion.yaml");
        std::fs::write(&path, "alignment:\n  max_iterations: 64\n").unwrap();

        let config = FusionConfig::load(&path).unwrap();
        assert_eq!(config.alignment.max_iterations, 64);

        assert!(FusionConfig::load(dir.path().join("missing.yaml")).is_err());
    }
}
