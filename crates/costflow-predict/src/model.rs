//! Baseline linear regressor over sparse one-hot rows
//!
//! Trained full-batch with Adam on mean squared error in scaled target
//! space. Stands in for any external modelling collaborator; swapping in a
//! different regressor only requires the same fit/predict shape.

use crate::error::PredictError;
use serde::{Deserialize, Serialize};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

/// Allowed epoch range
pub const EPOCH_RANGE: std::ops::RangeInclusive<usize> = 1..=500;

/// Allowed learning-rate range
pub const LEARNING_RATE_RANGE: std::ops::RangeInclusive<f64> = 0.0001..=0.1;

/// Hyper-parameters for one training run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Full-batch passes over the training split
    pub epochs: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Fraction of records held out for evaluation
    pub test_fraction: f64,
    /// Seed for the train/test shuffle
    pub seed: u64,
}

impl TrainingParams {
    /// Create default parameters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With epoch count
    #[inline]
    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// With learning rate
    #[inline]
    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// With split seed
    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check parameter ranges
    ///
    /// # Errors
    /// Returns [`PredictError::InvalidParams`] naming the first bad value
    pub fn validate(&self) -> Result<(), PredictError> {
        if !EPOCH_RANGE.contains(&self.epochs) {
            return Err(PredictError::InvalidParams(format!(
                "epochs must be in {}..={}, got {}",
                EPOCH_RANGE.start(),
                EPOCH_RANGE.end(),
                self.epochs
            )));
        }
        if !LEARNING_RATE_RANGE.contains(&self.learning_rate) {
            return Err(PredictError::InvalidParams(format!(
                "learning_rate must be in {}..={}, got {}",
                LEARNING_RATE_RANGE.start(),
                LEARNING_RATE_RANGE.end(),
                self.learning_rate
            )));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PredictError::InvalidParams(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            epochs: 50,
            learning_rate: 0.001,
            test_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Linear model: `bias + sum(weights[active])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    bias: f64,
    weights: Vec<f64>,
}

/// Per-parameter Adam moment estimates
struct AdamState {
    m: Vec<f64>,
    v: Vec<f64>,
    step: i32,
}

impl AdamState {
    fn new(len: usize) -> Self {
        Self {
            m: vec![0.0; len],
            v: vec![0.0; len],
            step: 0,
        }
    }

    /// Apply one update to `params` given their gradients
    fn update(&mut self, params: &mut [f64], grads: &[f64], learning_rate: f64) {
        self.step += 1;
        let correction1 = 1.0 - BETA1.powi(self.step);
        let correction2 = 1.0 - BETA2.powi(self.step);

        for (i, (param, grad)) in params.iter_mut().zip(grads).enumerate() {
            self.m[i] = BETA1 * self.m[i] + (1.0 - BETA1) * grad;
            self.v[i] = BETA2 * self.v[i] + (1.0 - BETA2) * grad * grad;
            let m_hat = self.m[i] / correction1;
            let v_hat = self.v[i] / correction2;
            *param -= learning_rate * m_hat / (v_hat.sqrt() + EPSILON);
        }
    }
}

impl LinearModel {
    /// Zero-initialised model over `width` feature slots
    #[must_use]
    pub fn zeros(width: usize) -> Self {
        Self {
            bias: 0.0,
            weights: vec![0.0; width],
        }
    }

    /// Number of feature slots
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.weights.len()
    }

    /// Predict for one row of active slots
    #[must_use]
    pub fn predict(&self, active: &[usize]) -> f64 {
        self.bias
            + active
                .iter()
                .filter_map(|&i| self.weights.get(i))
                .sum::<f64>()
    }

    /// Mean squared error over rows (0.0 when there are none)
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn mse(&self, rows: &[Vec<usize>], targets: &[f64]) -> f64 {
        if rows.is_empty() {
            return 0.0;
        }
        let sum: f64 = rows
            .iter()
            .zip(targets)
            .map(|(row, y)| (self.predict(row) - y).powi(2))
            .sum();
        sum / rows.len() as f64
    }

    /// Fit by full-batch Adam, returning the model and per-epoch training loss
    ///
    /// The loss recorded for an epoch is measured before that epoch's update.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(
        width: usize,
        rows: &[Vec<usize>],
        targets: &[f64],
        epochs: usize,
        learning_rate: f64,
    ) -> (Self, Vec<f64>) {
        let mut model = Self::zeros(width);
        let mut losses = Vec::with_capacity(epochs);
        if rows.is_empty() {
            return (model, losses);
        }

        // bias lives at the end of the parameter vector
        let mut params: Vec<f64> = vec![0.0; width + 1];
        let mut adam = AdamState::new(width + 1);
        let n = rows.len() as f64;

        for _ in 0..epochs {
            let mut grads = vec![0.0; width + 1];
            let mut loss = 0.0;
            for (row, y) in rows.iter().zip(targets) {
                let err = model.predict(row) - y;
                loss += err * err;
                let g = 2.0 * err / n;
                for &i in row {
                    grads[i] += g;
                }
                grads[width] += g;
            }
            losses.push(loss / n);

            adam.update(&mut params, &grads, learning_rate);
            model.weights.copy_from_slice(&params[..width]);
            model.bias = params[width];
        }

        (model, losses)
    }
}
