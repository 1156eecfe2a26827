//! Detection configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Default relative size tolerance for size matching (1%).
pub const DEFAULT_SIZE_TOLERANCE: f64 = 0.01;

/// Default minimum name similarity for grouping.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;

/// Default number of records per name-similarity chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Record count at which detection moves to a worker thread.
pub const DEFAULT_WORKER_THRESHOLD: usize = 10_000;

/// Records processed between yields in the single-pass strategies.
pub const DEFAULT_YIELD_INTERVAL: usize = 5_000;

/// Names shorter than this are compared by edit distance.
pub const DEFAULT_EDIT_DISTANCE_MAX_LEN: usize = 50;

/// Configuration shared by both execution contexts.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct DetectionConfig {
    /// Relative size tolerance, compared against `(max - min) / min`.
    #[builder(default = "DEFAULT_SIZE_TOLERANCE")]
    pub size_tolerance: f64,

    /// Minimum similarity (0.0 to 1.0) for two names to group.
    #[builder(default = "DEFAULT_SIMILARITY_THRESHOLD")]
    pub similarity_threshold: f64,

    /// Records per name-similarity chunk.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// Record count at which the dispatcher uses a worker.
    #[builder(default = "DEFAULT_WORKER_THRESHOLD")]
    pub worker_threshold: usize,

    /// Allow worker execution at all.
    #[builder(default = "true")]
    pub worker_enabled: bool,

    /// Records between cancellation checks in exact and hash matching.
    #[builder(default = "DEFAULT_YIELD_INTERVAL")]
    pub yield_interval: usize,

    /// Shorter-name length below which edit distance is used.
    #[builder(default = "DEFAULT_EDIT_DISTANCE_MAX_LEN")]
    pub edit_distance_max_len: usize,
}

impl DetectionConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(tolerance) = self.size_tolerance {
            if tolerance.is_nan() || tolerance < 0.0 {
                return Err(format!("size_tolerance must be non-negative, got {tolerance}"));
            }
        }
        if let Some(threshold) = self.similarity_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(format!(
                    "similarity_threshold must be within 0.0..=1.0, got {threshold}"
                ));
            }
        }
        if self.chunk_size == Some(0) {
            return Err("chunk_size must be greater than zero".to_string());
        }
        if self.yield_interval == Some(0) {
            return Err("yield_interval must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            size_tolerance: DEFAULT_SIZE_TOLERANCE,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            chunk_size: DEFAULT_CHUNK_SIZE,
            worker_threshold: DEFAULT_WORKER_THRESHOLD,
            worker_enabled: true,
            yield_interval: DEFAULT_YIELD_INTERVAL,
            edit_distance_max_len: DEFAULT_EDIT_DISTANCE_MAX_LEN,
        }
    }
}

impl DetectionConfig {
    /// Create a new config builder.
    pub fn builder() -> DetectionConfigBuilder {
        DetectionConfigBuilder::default()
    }

    /// Re-check a config that was deserialized rather than built.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        DetectionConfigBuilder::default()
            .size_tolerance(self.size_tolerance)
            .similarity_threshold(self.similarity_threshold)
            .chunk_size(self.chunk_size)
            .yield_interval(self.yield_interval)
            .build()
            .map(|_| ())
            .map_err(|e| crate::ConfigError::Invalid {
                message: e.to_string(),
            })
    }

    /// Parse and validate a TOML config. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, crate::ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|e| crate::ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Whether a dataset of `len` records should go to a worker.
    pub fn wants_worker(&self, len: usize) -> bool {
        self.worker_enabled && len >= self.worker_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.size_tolerance, 0.01);
        assert_eq!(config.similarity_threshold, 0.8);
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.worker_threshold, 10_000);
        assert!(config.worker_enabled);

        let built = DetectionConfig::builder().build().unwrap();
        assert_eq!(built, config);
    }

    #[test]
    fn test_config_builder() {
        let config = DetectionConfig::builder()
            .similarity_threshold(0.9)
            .chunk_size(10usize)
            .worker_enabled(false)
            .build()
            .unwrap();

        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.chunk_size, 10);
        assert!(!config.wants_worker(1_000_000));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(DetectionConfig::builder().similarity_threshold(1.5).build().is_err());
        assert!(DetectionConfig::builder().size_tolerance(-0.1).build().is_err());
        assert!(DetectionConfig::builder().chunk_size(0usize).build().is_err());
    }

    #[test]
    fn test_wants_worker_threshold() {
        let config = DetectionConfig::default();
        assert!(!config.wants_worker(9_999));
        assert!(config.wants_worker(10_000));
    }

    #[test]
    fn test_validate_deserialized_config() {
        let mut config = DetectionConfig::default();
        assert!(config.validate().is_ok());
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_toml_str() {
        let config = DetectionConfig::from_toml_str("similarity_threshold = 0.9\n").unwrap();
        assert_eq!(config.similarity_threshold, 0.9);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);

        let err = DetectionConfig::from_toml_str("chunk_size = \"many\"").unwrap_err();
        assert!(matches!(err, crate::ConfigError::Parse { .. }));

        let err = DetectionConfig::from_toml_str("chunk_size = 0").unwrap_err();
        assert!(matches!(err, crate::ConfigError::Invalid { .. }));
    }
}
