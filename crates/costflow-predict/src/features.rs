//! Sparse one-hot features over hierarchy labels
//!
//! Every record activates exactly one slot per encoded level and, for the
//! larger model, one slot per observed adjacent-level pair. A row is stored
//! as the list of its active slot indices.

use crate::encoder::LabelEncoder;
use crate::error::PredictError;
use crate::registry::ModelKind;
use costflow_record::{Level, Record};
use serde::{Deserialize, Serialize};

/// Levels used as predictors; level 1 is constant and carries no signal
pub const FEATURE_LEVELS: [Level; 4] = [Level::L2, Level::L3, Level::L4, Level::L5];

/// Adjacent level pairs used as interaction features
pub const INTERACTION_PAIRS: [(Level, Level); 3] = [
    (Level::L2, Level::L3),
    (Level::L3, Level::L4),
    (Level::L4, Level::L5),
];

const PAIR_SEPARATOR: char = '\u{1f}';

/// Query labels for one prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionQuery {
    /// Region
    pub level2: String,
    /// Country
    pub level3: String,
    /// Division
    pub level4: String,
    /// Service
    pub level5: String,
}

impl PredictionQuery {
    /// Create a query from four labels
    #[must_use]
    pub fn new(
        level2: impl Into<String>,
        level3: impl Into<String>,
        level4: impl Into<String>,
        level5: impl Into<String>,
    ) -> Self {
        Self {
            level2: level2.into(),
            level3: level3.into(),
            level4: level4.into(),
            level5: level5.into(),
        }
    }

    fn get(&self, level: Level) -> &str {
        match level {
            Level::L1 | Level::L2 => &self.level2,
            Level::L3 => &self.level3,
            Level::L4 => &self.level4,
            Level::L5 => &self.level5,
        }
    }
}

/// Fitted mapping from labels to sparse feature indices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    levels: Vec<LabelEncoder>,
    pairs: Vec<LabelEncoder>,
}

fn pair_key(a: &str, b: &str) -> String {
    let mut key = String::with_capacity(a.len() + b.len() + 1);
    key.push_str(a);
    key.push(PAIR_SEPARATOR);
    key.push_str(b);
    key
}

impl FeatureEncoder {
    /// Fit encoders for the given model kind
    #[must_use]
    pub fn fit(records: &[Record], kind: ModelKind) -> Self {
        let levels = FEATURE_LEVELS
            .iter()
            .map(|&level| LabelEncoder::fit(records.iter().map(|r| r.level(level))))
            .collect();

        let pairs = if kind.uses_interactions() {
            INTERACTION_PAIRS
                .iter()
                .map(|&(a, b)| {
                    let keys: Vec<String> = records
                        .iter()
                        .map(|r| pair_key(r.level(a), r.level(b)))
                        .collect();
                    LabelEncoder::fit(keys.iter().map(String::as_str))
                })
                .collect()
        } else {
            Vec::new()
        };

        Self { levels, pairs }
    }

    /// Total number of feature slots
    #[must_use]
    pub fn width(&self) -> usize {
        self.levels
            .iter()
            .chain(self.pairs.iter())
            .map(LabelEncoder::len)
            .sum()
    }

    /// Active slots for a record seen during fitting
    #[must_use]
    pub fn encode_record(&self, record: &Record) -> Vec<usize> {
        self.encode_with(|level| record.level(level))
            .unwrap_or_default()
    }

    /// Active slots for a query
    ///
    /// # Errors
    /// Returns [`PredictError::UnknownCategory`] if any single label is
    /// unseen. An unseen combination of known labels only drops the
    /// interaction slot.
    pub fn encode_query(&self, query: &PredictionQuery) -> Result<Vec<usize>, PredictError> {
        self.encode_with(|level| query.get(level))
    }

    fn encode_with<'a, F>(&self, value: F) -> Result<Vec<usize>, PredictError>
    where
        F: Fn(Level) -> &'a str,
    {
        let mut active = Vec::with_capacity(self.levels.len() + self.pairs.len());
        let mut offset = 0;

        for (encoder, &level) in self.levels.iter().zip(FEATURE_LEVELS.iter()) {
            let label = value(level);
            let index = encoder
                .transform(label)
                .ok_or_else(|| PredictError::unknown_category(level, label))?;
            active.push(offset + index);
            offset += encoder.len();
        }

        for (encoder, &(a, b)) in self.pairs.iter().zip(INTERACTION_PAIRS.iter()) {
            if let Some(index) = encoder.transform(&pair_key(value(a), value(b))) {
                active.push(offset + index);
            }
            offset += encoder.len();
        }

        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costflow_test_utils::sample_records;

    #[test]
    fn small_encodes_one_slot_per_level() {
        let records = sample_records();
        let enc = FeatureEncoder::fit(&records, ModelKind::Small);
        // 3 regions + 8 countries + 3 divisions + 4 services
        assert_eq!(enc.width(), 18);

        let active = enc.encode_record(&records[0]);
        assert_eq!(active.len(), 4);
        assert!(active.iter().all(|&i| i < enc.width()));
        assert!(active.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn big_adds_interaction_slots() {
        let records = sample_records();
        let small = FeatureEncoder::fit(&records, ModelKind::Small);
        let big = FeatureEncoder::fit(&records, ModelKind::Big);
        assert!(big.width() > small.width());
        assert_eq!(big.encode_record(&records[0]).len(), 7);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let records = sample_records();
        let enc = FeatureEncoder::fit(&records, ModelKind::Small);
        let query = PredictionQuery::new("EMEA", "Atlantis", "Retail Banking", "Network");
        assert_eq!(
            enc.encode_query(&query),
            Err(PredictError::unknown_category(Level::L3, "Atlantis"))
        );
    }

    #[test]
    fn unseen_combination_drops_interaction_only() {
        let records = sample_records();
        let enc = FeatureEncoder::fit(&records, ModelKind::Big);
        // Japan never appears under EMEA nor in Retail Banking
        let query = PredictionQuery::new("EMEA", "Japan", "Retail Banking", "Network");
        let active = enc.encode_query(&query).unwrap();
        assert_eq!(active.len(), 5);
    }
}
