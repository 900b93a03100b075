//! Categorical and numeric encoders
//!
//! [`LabelEncoder`] maps labels to dense indices; [`StandardScaler`] centres
//! and scales a numeric column. Both are fitted on training data and then
//! frozen inside a trained model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Sorted label vocabulary
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on observed labels; classes are sorted and deduplicated
    #[must_use]
    pub fn fit<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: BTreeSet<&str> = labels.into_iter().collect();
        Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        }
    }

    /// Index of a label, `None` if unseen
    #[inline]
    #[must_use]
    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
    }

    /// Label at an index
    #[inline]
    #[must_use]
    pub fn inverse(&self, index: usize) -> Option<&str> {
        self.classes.get(index).map(String::as_str)
    }

    /// Number of classes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if no classes were fitted
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Fitted classes in index order
    #[inline]
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Zero-mean, unit-variance scaling of one numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl StandardScaler {
    /// Fit on a non-empty sample (population standard deviation)
    ///
    /// A constant sample gets scale 1.0 so transforms stay finite.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::identity();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = var.sqrt();
        Self {
            mean,
            scale: if std > 0.0 { std } else { 1.0 },
        }
    }

    /// Scaler that leaves values unchanged
    #[inline]
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            mean: 0.0,
            scale: 1.0,
        }
    }

    /// Scale a raw value
    #[inline]
    #[must_use]
    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    /// Undo [`StandardScaler::transform`]
    #[inline]
    #[must_use]
    pub fn inverse(&self, scaled: f64) -> f64 {
        scaled * self.scale + self.mean
    }

    /// Fitted mean
    #[inline]
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Fitted scale
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}
