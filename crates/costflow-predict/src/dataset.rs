//! Encoded training data and the seeded train/test split

use crate::error::PredictError;
use crate::features::FeatureEncoder;
use costflow_record::Record;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Encoded rows paired with raw costs
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingSet {
    rows: Vec<Vec<usize>>,
    costs: Vec<f64>,
}

impl TrainingSet {
    /// Encode every record with a fitted encoder
    ///
    /// # Errors
    /// Returns [`PredictError::EmptyDataset`] for no records and
    /// [`PredictError::InsufficientData`] for a single one
    pub fn prepare(records: &[Record], features: &FeatureEncoder) -> Result<Self, PredictError> {
        match records.len() {
            0 => return Err(PredictError::EmptyDataset),
            1 => return Err(PredictError::InsufficientData { records: 1 }),
            _ => {}
        }
        Ok(Self {
            rows: records.iter().map(|r| features.encode_record(r)).collect(),
            costs: records.iter().map(Record::cost).collect(),
        })
    }

    /// Shuffle with `seed` and hold out `ceil(len * test_fraction)` rows
    ///
    /// Returns `(train, test)`; both sides are non-empty whenever the set
    /// has at least two rows.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    #[must_use]
    pub fn split(&self, test_fraction: f64, seed: u64) -> (Self, Self) {
        let n = self.len();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let upper = n.saturating_sub(1).max(1);
        let test_count = ((n as f64 * test_fraction).ceil() as usize).clamp(1, upper);
        let train = indices.split_off(test_count.min(n));
        (self.select(&train), self.select(&indices))
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            costs: indices.iter().map(|&i| self.costs[i]).collect(),
        }
    }

    /// Encoded rows
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    /// Raw costs, aligned with [`TrainingSet::rows`]
    #[inline]
    #[must_use]
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if there are no rows
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
