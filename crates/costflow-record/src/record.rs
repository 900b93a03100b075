//! Cost records
//!
//! A [`Record`] is one leaf cost entry: a value for each of the five
//! hierarchy levels plus a numeric cost.

use crate::level::Level;
use serde::{Deserialize, Serialize};

/// Immutable leaf cost entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    levels: [String; 5],
    cost: f64,
}

impl Record {
    /// Create a record from its five hierarchy values and cost
    #[must_use]
    pub fn new(
        level1: impl Into<String>,
        level2: impl Into<String>,
        level3: impl Into<String>,
        level4: impl Into<String>,
        level5: impl Into<String>,
        cost: f64,
    ) -> Self {
        Self {
            levels: [
                level1.into(),
                level2.into(),
                level3.into(),
                level4.into(),
                level5.into(),
            ],
            cost,
        }
    }

    /// Create a record from an already-assembled level array
    #[inline]
    #[must_use]
    pub fn from_levels(levels: [String; 5], cost: f64) -> Self {
        Self { levels, cost }
    }

    /// Value at the given hierarchy level
    #[inline]
    #[must_use]
    pub fn level(&self, level: Level) -> &str {
        &self.levels[usize::from(level.index() - 1)]
    }

    /// All five hierarchy values, root first
    #[inline]
    #[must_use]
    pub fn levels(&self) -> &[String; 5] {
        &self.levels
    }

    /// Cost measure
    #[inline]
    #[must_use]
    pub fn cost(&self) -> f64 {
        self.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_accessor_maps_to_columns() {
        let record = Record::new("Bank", "EMEA", "Germany", "Retail", "Hosting", 12.5);
        assert_eq!(record.level(Level::L1), "Bank");
        assert_eq!(record.level(Level::L2), "EMEA");
        assert_eq!(record.level(Level::L3), "Germany");
        assert_eq!(record.level(Level::L4), "Retail");
        assert_eq!(record.level(Level::L5), "Hosting");
        assert!((record.cost() - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn from_levels_matches_new() {
        let a = Record::new("a", "b", "c", "d", "e", 1.0);
        let b = Record::from_levels(
            ["a", "b", "c", "d", "e"].map(String::from),
            1.0,
        );
        assert_eq!(a, b);
    }
}
