//! Error types for training and prediction

use crate::registry::ModelKind;
use costflow_record::Level;

/// Errors raised by the model registry
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictError {
    /// Prediction requested before the model was trained
    #[error("model '{0}' not trained yet")]
    NotTrained(ModelKind),

    /// Label never seen during training
    #[error("unknown {level} value: '{value}'")]
    UnknownCategory { level: Level, value: String },

    /// Training requested on an empty record set
    #[error("cannot train on an empty record set")]
    EmptyDataset,

    /// Too few records to hold out a test split
    #[error("need at least 2 records to train, got {records}")]
    InsufficientData { records: usize },

    /// Training parameters out of range
    #[error("invalid training parameters: {0}")]
    InvalidParams(String),
}

impl PredictError {
    /// Create unknown category error
    pub fn unknown_category(level: Level, value: impl Into<String>) -> Self {
        Self::UnknownCategory {
            level,
            value: value.into(),
        }
    }

    /// Check if the error is caused by caller input rather than model state
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. } | Self::InvalidParams(_))
    }
}
