//! Dashboard configuration
//!
//! Loaded from TOML; every field has a default so a partial file (or none
//! at all) is valid.
//!
//! ```toml
//! data_path = "data/costs.csv"
//! top_n = 10
//! donut_slices = 8
//!
//! [training]
//! epochs = 100
//! learning_rate = 0.005
//! ```

use crate::error::ConfigError;
use costflow_predict::TrainingParams;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// CSV file with the cost records
    pub data_path: Option<PathBuf>,
    /// Length of the top-services and top-countries rankings
    pub top_n: usize,
    /// Named slices in the service share chart before the remainder bucket
    pub donut_slices: usize,
    /// Label of the remainder bucket
    pub other_label: String,
    /// Series and axis count of the division radar
    pub radar_size: usize,
    /// Defaults for model training
    pub training: TrainingParams,
}

impl DashboardConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With data path
    #[inline]
    #[must_use]
    pub fn with_data_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(path.into());
        self
    }

    /// With ranking length
    #[inline]
    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// With training defaults
    #[inline]
    #[must_use]
    pub fn with_training(mut self, training: TrainingParams) -> Self {
        self.training = training;
        self
    }

    /// Parse from TOML text and validate
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate
    ///
    /// A relative `data_path` is resolved against the file's directory.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;

        if let (Some(data), Some(dir)) = (config.data_path.as_mut(), path.parent()) {
            if data.is_relative() {
                *data = dir.join(&*data);
            }
        }

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::invalid("top_n", "must be at least 1"));
        }
        if self.donut_slices == 0 {
            return Err(ConfigError::invalid("donut_slices", "must be at least 1"));
        }
        if self.radar_size == 0 {
            return Err(ConfigError::invalid("radar_size", "must be at least 1"));
        }
        if self.other_label.trim().is_empty() {
            return Err(ConfigError::invalid("other_label", "must not be empty"));
        }
        self.training
            .validate()
            .map_err(|e| ConfigError::invalid("training", e.to_string()))
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            top_n: 10,
            donut_slices: 8,
            other_label: "Other".to_string(),
            radar_size: 5,
            training: TrainingParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_default() {
        assert_eq!(
            DashboardConfig::from_toml_str("").unwrap(),
            DashboardConfig::default()
        );
    }

    #[test]
    fn partial_training_table_keeps_other_defaults() {
        let config = DashboardConfig::from_toml_str(
            "top_n = 3\n[training]\nepochs = 120\n",
        )
        .unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.training.epochs, 120);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.donut_slices, 8);
    }

    #[test]
    fn out_of_range_values_rejected() {
        let err = DashboardConfig::from_toml_str("radar_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "radar_size", .. }));

        let err = DashboardConfig::from_toml_str("[training]\nepochs = 900").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "training", .. }));
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(matches!(
            DashboardConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn relative_data_path_resolves_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("costflow.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "data_path = \"costs.csv\"").unwrap();

        let config = DashboardConfig::load(&path).unwrap();
        assert_eq!(config.data_path, Some(dir.path().join("costs.csv")));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            DashboardConfig::load("/nonexistent/costflow.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
