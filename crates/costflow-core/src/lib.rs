//! costflow Core
//!
//! Ties the record store, the rollup and the model registry together
//! behind a single [`Dashboard`] handle.
//!
//! # Core Concepts
//!
//! - [`DashboardConfig`]: TOML-backed settings with defaults for every field
//! - [`Dashboard`]: Owns the records, configuration and model registry
//! - [`DashboardView`]: Serializable output of one filter change (flow
//!   graph, KPIs and every breakdown panel)
//! - [`DashboardError`]: One error type across loading, config and models
//!
//! # Example
//!
//! ```rust,ignore
//! use costflow_core::{Dashboard, DashboardConfig};
//! use costflow_record::Level;
//! use costflow_rollup::FilterSet;
//!
//! let config = DashboardConfig::load("costflow.toml")?;
//! let dashboard = Dashboard::open(config)?;
//!
//! let filters = FilterSet::new().with_only(Level::L2, ["EMEA"]);
//! let view = dashboard.view(&filters);
//! println!("total {:.0} over {} edges", view.summary.total_cost, view.flow.edges.len());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod dashboard;
pub mod error;

pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardView, Prediction};
pub use error::{ConfigError, DashboardError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with costflow Core
    pub use crate::{Dashboard, DashboardConfig, DashboardError, DashboardView, Prediction};
    pub use costflow_predict::{ModelKind, PredictionQuery, TrainingParams};
    pub use costflow_record::{Level, RecordStore};
    pub use costflow_rollup::{FilterSet, LevelFilter};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
