//! costflow Predict
//!
//! Baseline cost regression over hierarchy labels, held in an explicit
//! model registry.
//!
//! # Core Concepts
//!
//! - [`ModelKind`]: Registry key; `Small` uses level one-hots, `Big` adds
//!   adjacent-level interactions
//! - [`FeatureEncoder`]: Frozen label vocabularies mapping a record or a
//!   [`PredictionQuery`] to sparse feature slots
//! - [`StandardScaler`]: Target scaling fitted on the training split only
//! - [`ModelRegistry`]: Shared map of trained models with replace-on-retrain
//!   semantics and per-kind training history
//!
//! # Example
//!
//! ```rust,ignore
//! use costflow_predict::{ModelKind, ModelRegistry, PredictionQuery, TrainingParams};
//!
//! let registry = ModelRegistry::new();
//! let outcome = registry.train(
//!     ModelKind::Small,
//!     store.records(),
//!     store.fingerprint(),
//!     &TrainingParams::default(),
//! )?;
//! println!("test loss {:.4}", outcome.record.test_loss);
//!
//! let query = PredictionQuery::new("EMEA", "Germany", "Retail Banking", "Network");
//! let cost = registry.predict(ModelKind::Small, &query)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod dataset;
mod encoder;
mod error;
mod features;
mod model;
mod registry;

pub use dataset::TrainingSet;
pub use encoder::{LabelEncoder, StandardScaler};
pub use error::PredictError;
pub use features::{FeatureEncoder, PredictionQuery, FEATURE_LEVELS, INTERACTION_PAIRS};
pub use model::{LinearModel, TrainingParams, EPOCH_RANGE, LEARNING_RATE_RANGE};
pub use registry::{
    train_model, ModelKind, ModelRegistry, ModelStatus, TrainedModel, TrainingOutcome,
    TrainingRecord,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
