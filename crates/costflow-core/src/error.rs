//! Error types for costflow Core
//!
//! Wraps the per-crate errors behind one [`DashboardError`] so callers can
//! use `?` across loading, configuration and prediction.

use costflow_predict::PredictError;
use costflow_record::LoadError;
use std::path::PathBuf;

/// Main dashboard error type
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Record loading failed
    #[error("load failed: {0}")]
    Load(#[from] LoadError),

    /// Configuration invalid or unreadable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Training or prediction failed
    #[error("prediction failed: {0}")]
    Predict(#[from] PredictError),

    /// No data source configured
    #[error("no data path configured")]
    MissingDataPath,
}

impl DashboardError {
    /// Check if the error was caused by caller input
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Predict(e) => e.is_input_error(),
            Self::Config(ConfigError::Invalid { .. }) => true,
            _ => false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::DashboardConfig`]
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    /// Create invalid value error
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
