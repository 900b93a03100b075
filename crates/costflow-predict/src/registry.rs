//! Model registry
//!
//! [`ModelRegistry`] is the explicit store for trained models: a map from
//! [`ModelKind`] to the current model plus its training history. It is
//! passed to training and prediction rather than living in process-wide
//! state. Retraining a kind replaces its model atomically.

use crate::dataset::TrainingSet;
use crate::encoder::StandardScaler;
use crate::error::PredictError;
use crate::features::{FeatureEncoder, PredictionQuery};
use crate::model::{LinearModel, TrainingParams};
use chrono::{DateTime, Utc};
use costflow_record::{DatasetFingerprint, Record};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Registry key for a model variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// One-hot level features only
    Small,
    /// Level features plus adjacent-pair interactions
    Big,
}

impl ModelKind {
    /// All model kinds
    pub const ALL: [ModelKind; 2] = [ModelKind::Small, ModelKind::Big];

    /// Check if this kind encodes adjacent-level interactions
    #[inline]
    #[must_use]
    pub const fn uses_interactions(self) -> bool {
        matches!(self, Self::Big)
    }

    /// Registry name
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Big => "big",
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "big" => Ok(Self::Big),
            other => Err(PredictError::InvalidParams(format!(
                "unknown model kind: '{other}'"
            ))),
        }
    }
}

/// A fitted model with its frozen encoders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub kind: ModelKind,
    pub features: FeatureEncoder,
    /// Fitted on training-split targets only
    pub target_scaler: StandardScaler,
    pub model: LinearModel,
    /// Data the model was trained on
    pub fingerprint: DatasetFingerprint,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Predicted cost for a query, never negative
    ///
    /// # Errors
    /// Returns [`PredictError::UnknownCategory`] for unseen labels
    pub fn predict(&self, query: &PredictionQuery) -> Result<f64, PredictError> {
        let active = self.features.encode_query(query)?;
        Ok(self.predict_active(&active))
    }

    fn predict_active(&self, active: &[usize]) -> f64 {
        self.target_scaler
            .inverse(self.model.predict(active))
            .max(0.0)
    }
}

/// One completed training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub run_id: Uuid,
    pub kind: ModelKind,
    pub trained_at: DateTime<Utc>,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Final training MSE in scaled target space
    pub train_loss: f64,
    /// Held-out MSE in scaled target space
    pub test_loss: f64,
    /// Held-out root mean squared error in cost units
    pub test_rmse: f64,
    pub train_records: usize,
    pub test_records: usize,
    pub fingerprint: DatasetFingerprint,
}

/// Result of [`ModelRegistry::train`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingOutcome {
    /// History entry appended for this run
    pub record: TrainingRecord,
    /// Training loss per epoch
    pub epoch_losses: Vec<f64>,
}

/// Snapshot of a registry slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub kind: ModelKind,
    pub trained: bool,
    pub trained_at: Option<DateTime<Utc>>,
    pub fingerprint: Option<DatasetFingerprint>,
    pub last_test_loss: Option<f64>,
    /// Number of completed training runs
    pub runs: usize,
}

#[derive(Debug, Default)]
struct ModelSlot {
    model: Option<Arc<TrainedModel>>,
    history: Vec<TrainingRecord>,
}

/// Shared store of trained models keyed by [`ModelKind`]
///
/// Cloning shares the underlying store.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    slots: Arc<RwLock<HashMap<ModelKind, ModelSlot>>>,
}

/// Fit a model without touching any registry
///
/// # Errors
/// Returns error for invalid parameters or fewer than two records
#[allow(clippy::cast_precision_loss)]
pub fn train_model(
    kind: ModelKind,
    records: &[Record],
    fingerprint: DatasetFingerprint,
    params: &TrainingParams,
) -> Result<(TrainedModel, TrainingOutcome), PredictError> {
    params.validate()?;

    let features = FeatureEncoder::fit(records, kind);
    let (train, test) =
        TrainingSet::prepare(records, &features)?.split(params.test_fraction, params.seed);

    let target_scaler = StandardScaler::fit(train.costs());
    let scaled = |set: &TrainingSet| -> Vec<f64> {
        set.costs().iter().map(|&c| target_scaler.transform(c)).collect()
    };
    let train_targets = scaled(&train);
    let test_targets = scaled(&test);

    let (model, epoch_losses) = LinearModel::fit(
        features.width(),
        train.rows(),
        &train_targets,
        params.epochs,
        params.learning_rate,
    );

    let trained_at = Utc::now();
    let trained = TrainedModel {
        kind,
        features,
        target_scaler,
        model,
        fingerprint,
        trained_at,
    };

    let train_loss = trained.model.mse(train.rows(), &train_targets);
    let test_loss = trained.model.mse(test.rows(), &test_targets);
    let squared: f64 = test
        .rows()
        .iter()
        .zip(test.costs())
        .map(|(row, cost)| (trained.predict_active(row) - cost).powi(2))
        .sum();
    let test_rmse = (squared / test.len() as f64).sqrt();

    let record = TrainingRecord {
        run_id: Uuid::new_v4(),
        kind,
        trained_at,
        epochs: params.epochs,
        learning_rate: params.learning_rate,
        train_loss,
        test_loss,
        test_rmse,
        train_records: train.len(),
        test_records: test.len(),
        fingerprint,
    };

    Ok((
        trained,
        TrainingOutcome {
            record,
            epoch_losses,
        },
    ))
}

impl ModelRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Train a model and replace whatever was stored under `kind`
    ///
    /// Fitting happens outside the lock; readers keep using the previous
    /// model until the swap.
    ///
    /// # Errors
    /// Returns error for invalid parameters or too few records; the
    /// registry is left unchanged
    pub fn train(
        &self,
        kind: ModelKind,
        records: &[Record],
        fingerprint: DatasetFingerprint,
        params: &TrainingParams,
    ) -> Result<TrainingOutcome, PredictError> {
        let (model, outcome) = train_model(kind, records, fingerprint, params)?;

        tracing::info!(
            model = %kind,
            run_id = %outcome.record.run_id,
            epochs = params.epochs,
            train_loss = outcome.record.train_loss,
            test_loss = outcome.record.test_loss,
            "trained model"
        );

        let mut slots = self.slots.write();
        let slot = slots.entry(kind).or_default();
        slot.model = Some(Arc::new(model));
        slot.history.push(outcome.record.clone());
        Ok(outcome)
    }

    /// Current model for a kind
    #[must_use]
    pub fn get(&self, kind: ModelKind) -> Option<Arc<TrainedModel>> {
        self.slots.read().get(&kind).and_then(|s| s.model.clone())
    }

    /// Predict a cost with the current model for `kind`
    ///
    /// # Errors
    /// Returns [`PredictError::NotTrained`] or [`PredictError::UnknownCategory`]
    pub fn predict(&self, kind: ModelKind, query: &PredictionQuery) -> Result<f64, PredictError> {
        let model = self.get(kind).ok_or(PredictError::NotTrained(kind))?;
        model.predict(query)
    }

    /// Check if a kind has a trained model
    #[must_use]
    pub fn is_trained(&self, kind: ModelKind) -> bool {
        self.get(kind).is_some()
    }

    /// Check if the model for `kind` was trained on different data
    ///
    /// Untrained kinds are not stale.
    #[must_use]
    pub fn is_stale(&self, kind: ModelKind, current: DatasetFingerprint) -> bool {
        self.get(kind).is_some_and(|m| m.fingerprint != current)
    }

    /// Training runs for a kind, oldest first
    #[must_use]
    pub fn history(&self, kind: ModelKind) -> Vec<TrainingRecord> {
        self.slots
            .read()
            .get(&kind)
            .map(|s| s.history.clone())
            .unwrap_or_default()
    }

    /// Status snapshot for a kind
    #[must_use]
    pub fn status(&self, kind: ModelKind) -> ModelStatus {
        let slots = self.slots.read();
        let slot = slots.get(&kind);
        let model = slot.and_then(|s| s.model.as_ref());
        ModelStatus {
            kind,
            trained: model.is_some(),
            trained_at: model.map(|m| m.trained_at),
            fingerprint: model.map(|m| m.fingerprint),
            last_test_loss: slot.and_then(|s| s.history.last()).map(|r| r.test_loss),
            runs: slot.map_or(0, |s| s.history.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costflow_test_utils::sample_records;

    fn fingerprint(records: &[Record]) -> DatasetFingerprint {
        DatasetFingerprint::of_records(records)
    }

    #[test]
    fn kind_parse_and_display() {
        assert_eq!("small".parse::<ModelKind>().unwrap(), ModelKind::Small);
        assert_eq!(" BIG ".parse::<ModelKind>().unwrap(), ModelKind::Big);
        assert!("huge".parse::<ModelKind>().is_err());
        assert_eq!(ModelKind::Big.to_string(), "big");
    }

    #[test]
    fn predict_before_training_fails() {
        let registry = ModelRegistry::new();
        let query = PredictionQuery::new("EMEA", "Germany", "Retail Banking", "Network");
        assert_eq!(
            registry.predict(ModelKind::Small, &query),
            Err(PredictError::NotTrained(ModelKind::Small))
        );
        assert!(!registry.status(ModelKind::Small).trained);
    }

    #[test]
    fn train_then_predict() {
        let records = sample_records();
        let registry = ModelRegistry::new();
        let params = TrainingParams::new().with_epochs(100).with_learning_rate(0.05);

        let outcome = registry
            .train(ModelKind::Small, &records, fingerprint(&records), &params)
            .unwrap();
        assert_eq!(outcome.epoch_losses.len(), 100);
        assert_eq!(outcome.record.train_records + outcome.record.test_records, records.len());
        assert!(outcome.record.test_rmse.is_finite());

        let query = PredictionQuery::new("AMER", "USA", "Investment Banking", "Market Data");
        let cost = registry.predict(ModelKind::Small, &query).unwrap();
        assert!(cost.is_finite());
        assert!(cost >= 0.0);

        // the other kind is untouched
        assert!(!registry.is_trained(ModelKind::Big));
    }

    #[test]
    fn unknown_label_reports_level() {
        let records = sample_records();
        let registry = ModelRegistry::new();
        registry
            .train(ModelKind::Big, &records, fingerprint(&records), &TrainingParams::default())
            .unwrap();
        let query = PredictionQuery::new("Mars", "USA", "Investment Banking", "Market Data");
        let err = registry.predict(ModelKind::Big, &query).unwrap_err();
        assert!(err.is_input_error());
        assert!(err.to_string().contains("Mars"));
    }

    #[test]
    fn retrain_replaces_model_and_appends_history() {
        let records = sample_records();
        let registry = ModelRegistry::new();
        let params = TrainingParams::default();

        registry
            .train(ModelKind::Small, &records, fingerprint(&records), &params)
            .unwrap();
        let first = registry.get(ModelKind::Small).unwrap();

        registry
            .train(ModelKind::Small, &records, fingerprint(&records), &params)
            .unwrap();
        let second = registry.get(ModelKind::Small).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        let history = registry.history(ModelKind::Small);
        assert_eq!(history.len(), 2);
        assert_ne!(history[0].run_id, history[1].run_id);
        assert_eq!(registry.status(ModelKind::Small).runs, 2);
    }

    #[test]
    fn failed_training_leaves_registry_unchanged() {
        let records = sample_records();
        let registry = ModelRegistry::new();
        let bad = TrainingParams::new().with_epochs(0);
        assert!(registry
            .train(ModelKind::Small, &records, fingerprint(&records), &bad)
            .is_err());
        assert!(registry.history(ModelKind::Small).is_empty());

        let single = &records[..1];
        assert_eq!(
            registry
                .train(ModelKind::Small, single, fingerprint(single), &TrainingParams::default())
                .unwrap_err(),
            PredictError::InsufficientData { records: 1 }
        );
        assert_eq!(
            registry
                .train(ModelKind::Small, &[], fingerprint(&[]), &TrainingParams::default())
                .unwrap_err(),
            PredictError::EmptyDataset
        );
    }

    #[test]
    fn stale_when_data_changes() {
        let records = sample_records();
        let registry = ModelRegistry::new();
        let fp = fingerprint(&records);
        assert!(!registry.is_stale(ModelKind::Small, fp));

        registry
            .train(ModelKind::Small, &records, fp, &TrainingParams::default())
            .unwrap();
        assert!(!registry.is_stale(ModelKind::Small, fp));
        assert!(registry.is_stale(ModelKind::Small, fingerprint(&records[..3])));
    }

    #[test]
    fn clones_share_models() {
        let records = sample_records();
        let registry = ModelRegistry::new();
        let handle = registry.clone();
        registry
            .train(ModelKind::Big, &records, fingerprint(&records), &TrainingParams::default())
            .unwrap();
        assert!(handle.is_trained(ModelKind::Big));
    }
}
