//! KPI summary over a filtered record set

use costflow_record::{Level, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Summary statistics for a filtered record set
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    /// Sum of cost over all records
    pub total_cost: f64,
    /// Distinct level-2 values (regions)
    pub distinct_level2: usize,
    /// Distinct level-4 values (divisions)
    pub distinct_level4: usize,
    /// `total_cost / record_count`, or 0.0 for an empty set
    pub mean_cost: f64,
    /// Number of records summarised
    pub record_count: usize,
}

impl Summary {
    /// All-zero summary of an empty set
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            total_cost: 0.0,
            distinct_level2: 0,
            distinct_level4: 0,
            mean_cost: 0.0,
            record_count: 0,
        }
    }

    /// Summarise records in order
    #[must_use]
    pub fn from_records(records: &[&Record]) -> Self {
        if records.is_empty() {
            return Self::zero();
        }

        let total_cost: f64 = records.iter().map(|r| r.cost()).sum();
        let distinct = |level: Level| {
            records
                .iter()
                .map(|r| r.level(level))
                .collect::<HashSet<_>>()
                .len()
        };

        #[allow(clippy::cast_precision_loss)]
        let mean_cost = total_cost / records.len() as f64;

        Self {
            total_cost,
            distinct_level2: distinct(Level::L2),
            distinct_level4: distinct(Level::L4),
            mean_cost,
            record_count: records.len(),
        }
    }

    /// Check if nothing was summarised
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}
