//! Dashboard orchestration
//!
//! A [`Dashboard`] owns the loaded records, the configuration and a model
//! registry. Each filter change produces a fresh [`DashboardView`]; nothing
//! is cached between selections.

use crate::config::DashboardConfig;
use crate::error::DashboardError;
use costflow_predict::{
    ModelKind, ModelRegistry, ModelStatus, PredictionQuery, TrainingOutcome, TrainingParams,
};
use costflow_record::{Level, RecordStore};
use costflow_rollup::breakdown::{self, CostMatrix, CumulativePoint, Distribution, LabelCost};
use costflow_rollup::{
    build_flow, cascade_options, hierarchy_tree, FilterOptions, FilterSet, FlowGraph, Summary,
    TreeNode,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Levels shown in the sunburst, outermost last
const SUNBURST_LEVELS: [Level; 4] = [Level::L2, Level::L3, Level::L4, Level::L5];

/// Everything rendered for one filter selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// Selection this view was computed for
    pub filters: FilterSet,
    /// Sankey input
    pub flow: FlowGraph,
    /// KPI cards
    pub summary: Summary,
    /// Cost per region
    pub region_totals: Vec<LabelCost>,
    /// Cost per division
    pub division_totals: Vec<LabelCost>,
    /// Most expensive services
    pub top_services: Vec<LabelCost>,
    /// Most expensive countries
    pub top_countries: Vec<LabelCost>,
    /// Service share with a remainder bucket
    pub service_share: Vec<LabelCost>,
    /// Region by division heatmap
    pub region_division: CostMatrix,
    /// Pareto curve over individual records
    pub cumulative: Vec<CumulativePoint>,
    /// Record cost spread per region
    pub region_distribution: Vec<Distribution>,
    /// Region to service hierarchy
    pub sunburst: Vec<TreeNode>,
    /// Top regions across top divisions
    pub division_radar: CostMatrix,
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub kind: ModelKind,
    pub query: PredictionQuery,
    /// Predicted cost, never negative
    pub cost: f64,
    /// Model was trained on a different record set than the one loaded
    pub stale: bool,
}

/// Record store, configuration and model registry behind one handle
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: RecordStore,
    config: DashboardConfig,
    models: ModelRegistry,
}

impl Dashboard {
    /// Create a dashboard over an already loaded store
    ///
    /// # Errors
    /// Returns [`DashboardError::Config`] if the configuration is invalid
    pub fn new(store: RecordStore, config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            models: ModelRegistry::new(),
        })
    }

    /// Load records from the configured data path
    ///
    /// # Errors
    /// Returns error if no path is configured or loading fails
    pub fn open(config: DashboardConfig) -> Result<Self, DashboardError> {
        let path = config
            .data_path
            .clone()
            .ok_or(DashboardError::MissingDataPath)?;
        let store = RecordStore::from_csv_path(&path)?;
        Self::new(store, config)
    }

    /// Share an existing model registry
    #[inline]
    #[must_use]
    pub fn with_registry(mut self, models: ModelRegistry) -> Self {
        self.models = models;
        self
    }

    /// Loaded records
    #[inline]
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Model registry
    #[inline]
    #[must_use]
    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Recompute every panel for a filter selection
    #[must_use]
    pub fn view(&self, filters: &FilterSet) -> DashboardView {
        let started = Instant::now();
        let records = filters.apply(self.store.records());
        let cfg = &self.config;

        let view = DashboardView {
            filters: filters.clone(),
            flow: build_flow(&records),
            summary: Summary::from_records(&records),
            region_totals: breakdown::level_totals(&records, Level::L2),
            division_totals: breakdown::level_totals(&records, Level::L4),
            top_services: breakdown::top_n(&records, Level::L5, cfg.top_n),
            top_countries: breakdown::top_n(&records, Level::L3, cfg.top_n),
            service_share: breakdown::top_n_with_other(
                &records,
                Level::L5,
                cfg.donut_slices,
                &cfg.other_label,
            ),
            region_division: breakdown::pivot(&records, Level::L2, Level::L4),
            cumulative: breakdown::cumulative(&records),
            region_distribution: breakdown::distribution_by(&records, Level::L2),
            sunburst: hierarchy_tree(&records, &SUNBURST_LEVELS),
            division_radar: breakdown::radar(&records, Level::L4, Level::L2, cfg.radar_size),
        };

        tracing::info!(
            filtered = records.len(),
            total = self.store.len(),
            nodes = view.flow.nodes.len(),
            edges = view.flow.edges.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "computed dashboard view"
        );
        view
    }

    /// Options for the cascading level selectors
    #[must_use]
    pub fn filter_options(&self, filters: &FilterSet) -> FilterOptions {
        cascade_options(self.store.records(), filters)
    }

    /// Train a model on the full record set
    ///
    /// `params` falls back to the configured training defaults.
    ///
    /// # Errors
    /// Returns [`DashboardError::Predict`] for invalid parameters or too
    /// few records
    pub fn train(
        &self,
        kind: ModelKind,
        params: Option<TrainingParams>,
    ) -> Result<TrainingOutcome, DashboardError> {
        let params = params.unwrap_or(self.config.training);
        let outcome = self.models.train(
            kind,
            self.store.records(),
            self.store.fingerprint(),
            &params,
        )?;
        Ok(outcome)
    }

    /// Predict a cost with the current model for `kind`
    ///
    /// # Errors
    /// Returns [`DashboardError::Predict`] if the model is untrained or a
    /// label is unknown
    pub fn predict(
        &self,
        kind: ModelKind,
        query: PredictionQuery,
    ) -> Result<Prediction, DashboardError> {
        let cost = self.models.predict(kind, &query)?;
        let stale = self.models.is_stale(kind, self.store.fingerprint());
        if stale {
            tracing::warn!(model = %kind, "model was trained on a different record set");
        }
        Ok(Prediction {
            kind,
            query,
            cost,
            stale,
        })
    }

    /// Status of every model kind
    #[must_use]
    pub fn model_status(&self) -> Vec<ModelStatus> {
        ModelKind::ALL
            .iter()
            .map(|&kind| self.models.status(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costflow_record::Record;
    use costflow_test_utils::{sample_records, sample_store};

    fn dashboard() -> Dashboard {
        Dashboard::new(sample_store(), DashboardConfig::default()).unwrap()
    }

    #[test]
    fn invalid_config_rejected() {
        let config = DashboardConfig::default().with_top_n(0);
        assert!(matches!(
            Dashboard::new(sample_store(), config),
            Err(DashboardError::Config(_))
        ));
    }

    #[test]
    fn open_without_path_fails() {
        assert!(matches!(
            Dashboard::open(DashboardConfig::default()),
            Err(DashboardError::MissingDataPath)
        ));
    }

    #[test]
    fn unfiltered_view_covers_everything() {
        let view = dashboard().view(&FilterSet::new());
        assert_eq!(view.summary.total_cost, 17250.0);
        assert_eq!(view.region_totals[0].label, "EMEA");
        assert_eq!(view.region_totals[0].cost, 9250.0);
        assert_eq!(view.region_totals.len(), 3);
        assert_eq!(view.division_radar.rows.len(), 3);
        assert_eq!(view.division_radar.columns.len(), 3);
        assert_eq!(view.cumulative.len(), 13);
        assert_eq!(view.cumulative.last().map(|p| p.cumulative), Some(17250.0));
    }

    #[test]
    fn service_share_buckets_remainder() {
        let config = DashboardConfig {
            donut_slices: 2,
            other_label: "Rest".to_string(),
            ..DashboardConfig::default()
        };
        let view = Dashboard::new(sample_store(), config)
            .unwrap()
            .view(&FilterSet::new());
        assert_eq!(view.service_share.len(), 3);
        assert_eq!(view.service_share[2].label, "Rest");
        let shown: f64 = view.service_share.iter().map(|s| s.cost).sum();
        assert_eq!(shown, 17250.0);
    }

    #[test]
    fn filtered_view_narrows_every_panel() {
        let filters = FilterSet::new().with_only(Level::L2, ["APAC"]);
        let view = dashboard().view(&filters);
        assert_eq!(view.summary.total_cost, 2550.0);
        assert_eq!(view.region_totals.len(), 1);
        assert_eq!(view.top_countries.len(), 3);
        assert_eq!(view.region_division.rows, vec!["APAC"]);
        assert!(view
            .sunburst
            .iter()
            .all(|n| n.id.starts_with("APAC")));
    }

    #[test]
    fn options_follow_upper_filters() {
        let filters = FilterSet::new().with_only(Level::L2, ["AMER"]);
        let options = dashboard().filter_options(&filters);
        assert_eq!(options.level2.len(), 3);
        assert_eq!(options.level3, vec!["Brazil", "USA"]);
    }

    #[test]
    fn predict_requires_training() {
        let dash = dashboard();
        let query = PredictionQuery::new("EMEA", "Germany", "Retail Banking", "Network");
        let err = dash.predict(ModelKind::Small, query.clone()).unwrap_err();
        assert!(matches!(err, DashboardError::Predict(_)));
        assert!(!err.is_input_error());

        dash.train(ModelKind::Small, None).unwrap();
        let prediction = dash.predict(ModelKind::Small, query).unwrap();
        assert!(prediction.cost >= 0.0);
        assert!(!prediction.stale);
    }

    #[test]
    fn shared_registry_flags_stale_models() {
        let trained = dashboard();
        trained.train(ModelKind::Big, None).unwrap();

        let mut records = sample_records();
        records.push(Record::new("Deutsche Bank", "EMEA", "UK", "Retail Banking", "Network", 75.0));
        let other = Dashboard::new(RecordStore::new(records), DashboardConfig::default())
            .unwrap()
            .with_registry(trained.models().clone());

        let query = PredictionQuery::new("EMEA", "UK", "Investment Banking", "Market Data");
        assert!(other.predict(ModelKind::Big, query).unwrap().stale);
    }

    #[test]
    fn status_lists_both_kinds() {
        let dash = dashboard();
        dash.train(ModelKind::Small, Some(TrainingParams::new().with_epochs(5)))
            .unwrap();
        let status = dash.model_status();
        assert_eq!(status.len(), 2);
        assert!(status[0].trained);
        assert!(!status[1].trained);
        assert_eq!(dash.models().history(ModelKind::Small)[0].epochs, 5);
    }
}
