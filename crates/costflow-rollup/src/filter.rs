//! Per-level filter selection
//!
//! Provides [`FilterSet`], the active restriction applied before any rollup,
//! and [`cascade_options`], which derives the option lists offered for the
//! lower levels from the records that survive the upper-level filters.

use costflow_record::{Level, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sentinel value meaning "no restriction" when it appears in a value list
pub const ALL_SENTINEL: &str = "ALL";

static UNRESTRICTED: LevelFilter = LevelFilter::All;

/// Restriction on the values of a single level
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LevelFilter {
    /// Every value passes
    #[default]
    All,

    /// Only the listed values pass; an empty set passes nothing
    Only(BTreeSet<String>),
}

impl LevelFilter {
    /// Restrict to the given values
    #[must_use]
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(values.into_iter().map(Into::into).collect())
    }

    /// Interpret a UI value list: [`ALL_SENTINEL`] anywhere means [`LevelFilter::All`]
    #[must_use]
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.contains(ALL_SENTINEL) {
            Self::All
        } else {
            Self::Only(values)
        }
    }

    /// Check if a value passes this filter
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(values) => values.contains(value),
        }
    }

    /// Check if this filter restricts anything
    #[inline]
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    fn to_values(&self) -> Vec<String> {
        match self {
            Self::All => vec![ALL_SENTINEL.to_string()],
            Self::Only(values) => values.iter().cloned().collect(),
        }
    }
}

/// Active filter selection for levels 2 through 5
///
/// Level 1 is the hierarchy root and cannot be filtered; attempts to set it
/// are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct FilterSet {
    filters: BTreeMap<Level, LevelFilter>,
}

impl FilterSet {
    /// Filter set with every level unrestricted
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a filter for a level
    #[must_use]
    pub fn with(mut self, level: Level, filter: LevelFilter) -> Self {
        self.set(level, filter);
        self
    }

    /// With a level restricted to the given values
    #[must_use]
    pub fn with_only<I, S>(self, level: Level, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(level, LevelFilter::only(values))
    }

    /// Set the filter for a level
    pub fn set(&mut self, level: Level, filter: LevelFilter) {
        if level == Level::L1 {
            tracing::warn!("ignoring filter on root level");
            return;
        }
        if filter.is_all() {
            self.filters.remove(&level);
        } else {
            self.filters.insert(level, filter);
        }
    }

    /// Build from raw `(level name, values)` pairs as a UI would send them
    ///
    /// Unknown level names and the root level are skipped.
    #[must_use]
    pub fn from_pairs<I, K, V, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for (key, values) in pairs {
            match key.as_ref().parse::<Level>() {
                Ok(level) => set.set(level, LevelFilter::from_values(values)),
                Err(e) => tracing::warn!(key = key.as_ref(), "ignoring filter key: {e}"),
            }
        }
        set
    }

    /// Filter for a level ([`LevelFilter::All`] when unset)
    #[inline]
    #[must_use]
    pub fn get(&self, level: Level) -> &LevelFilter {
        self.filters.get(&level).unwrap_or(&UNRESTRICTED)
    }

    /// Check if no level is restricted
    #[inline]
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.filters.is_empty()
    }

    /// Check if a record passes every level filter
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        self.filters
            .iter()
            .all(|(level, filter)| filter.accepts(record.level(*level)))
    }

    /// Apply filters in level order 2 → 5, keeping record order
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [Record]) -> Vec<&'a Record> {
        let mut kept: Vec<&Record> = records.iter().collect();
        for level in Level::FILTERABLE {
            narrow(&mut kept, level, self.get(level));
        }
        kept
    }
}

fn narrow(records: &mut Vec<&Record>, level: Level, filter: &LevelFilter) {
    if !filter.is_all() {
        records.retain(|r| filter.accepts(r.level(level)));
    }
}

impl From<BTreeMap<String, Vec<String>>> for FilterSet {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self::from_pairs(map)
    }
}

impl From<FilterSet> for BTreeMap<String, Vec<String>> {
    fn from(set: FilterSet) -> Self {
        set.filters
            .iter()
            .map(|(level, filter)| (level.to_string(), filter.to_values()))
            .collect()
    }
}

/// Option lists for the cascading level selectors
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FilterOptions {
    /// All level-2 values
    pub level2: Vec<String>,
    /// Level-3 values among records passing the level-2 filter
    pub level3: Vec<String>,
    /// Level-4 values among records passing the level-2 and level-3 filters
    pub level4: Vec<String>,
    /// Level-5 values among records passing the level-2 to level-4 filters
    pub level5: Vec<String>,
}

/// Derive cascading option lists from the current selection
///
/// Each list is rebuilt from the already narrowed record set, so no option
/// is offered that maps to zero currently filtered records. The level-5
/// filter never narrows an option list.
#[must_use]
pub fn cascade_options(records: &[Record], filters: &FilterSet) -> FilterOptions {
    let mut narrowed: Vec<&Record> = records.iter().collect();
    let level2 = distinct(&narrowed, Level::L2);

    narrow(&mut narrowed, Level::L2, filters.get(Level::L2));
    let level3 = distinct(&narrowed, Level::L3);

    narrow(&mut narrowed, Level::L3, filters.get(Level::L3));
    let level4 = distinct(&narrowed, Level::L4);

    narrow(&mut narrowed, Level::L4, filters.get(Level::L4));
    let level5 = distinct(&narrowed, Level::L5);

    FilterOptions {
        level2,
        level3,
        level4,
        level5,
    }
}

fn distinct(records: &[&Record], level: Level) -> Vec<String> {
    records
        .iter()
        .map(|r| r.level(level))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<Record> {
        vec![
            Record::new("Bank", "EMEA", "Germany", "Retail", "Hosting", 10.0),
            Record::new("Bank", "EMEA", "France", "Markets", "Network", 20.0),
            Record::new("Bank", "APAC", "Japan", "Retail", "Storage", 30.0),
            Record::new("Bank", "AMER", "USA", "Markets", "Hosting", 40.0),
        ]
    }

    #[test]
    fn default_passes_everything() {
        let data = records();
        let set = FilterSet::new();
        assert!(set.is_unrestricted());
        assert_eq!(set.apply(&data).len(), 4);
    }

    #[test]
    fn only_keeps_matching_values_in_order() {
        let data = records();
        let set = FilterSet::new().with_only(Level::L2, ["EMEA", "AMER"]);
        let kept: Vec<f64> = set.apply(&data).iter().map(|r| r.cost()).collect();
        assert_eq!(kept, vec![10.0, 20.0, 40.0]);
    }

    #[test]
    fn filters_combine_across_levels() {
        let data = records();
        let set = FilterSet::new()
            .with_only(Level::L2, ["EMEA"])
            .with_only(Level::L4, ["Markets"]);
        let kept = set.apply(&data);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].level(Level::L3), "France");
    }

    #[test]
    fn empty_selection_passes_nothing() {
        let data = records();
        let set = FilterSet::new().with(Level::L3, LevelFilter::only(Vec::<String>::new()));
        assert!(set.apply(&data).is_empty());
    }

    #[test]
    fn absent_value_matches_nothing() {
        let data = records();
        let set = FilterSet::new().with_only(Level::L2, ["Mars"]);
        assert!(set.apply(&data).is_empty());
    }

    #[test]
    fn all_sentinel_in_list_means_unrestricted() {
        assert_eq!(LevelFilter::from_values(["EMEA", "ALL"]), LevelFilter::All);
        assert_eq!(
            LevelFilter::from_values(["EMEA"]),
            LevelFilter::only(["EMEA"])
        );
    }

    #[test]
    fn root_level_filter_is_ignored() {
        let set = FilterSet::new().with_only(Level::L1, ["Other"]);
        assert!(set.is_unrestricted());
        assert_eq!(set.apply(&records()).len(), 4);
    }

    #[test]
    fn from_pairs_skips_unknown_keys() {
        let set = FilterSet::from_pairs([
            ("level2", vec!["EMEA"]),
            ("level9", vec!["x"]),
            ("region", vec!["y"]),
            ("level5", vec!["ALL"]),
        ]);
        assert_eq!(set.get(Level::L2), &LevelFilter::only(["EMEA"]));
        assert!(set.get(Level::L5).is_all());
        assert_eq!(set.apply(&records()).len(), 2);
    }

    #[test]
    fn matches_agrees_with_apply() {
        let data = records();
        let set = FilterSet::new()
            .with_only(Level::L4, ["Retail"])
            .with_only(Level::L5, ["Storage", "Hosting"]);
        let via_apply = set.apply(&data).len();
        let via_matches = data.iter().filter(|r| set.matches(r)).count();
        assert_eq!(via_apply, via_matches);
        assert_eq!(via_apply, 2);
    }

    #[test]
    fn serde_round_trip_as_map() {
        let set = FilterSet::new().with_only(Level::L3, ["Germany", "France"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"level3":["France","Germany"]}"#);
        let parsed: FilterSet = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn deserialize_ignores_unknown_levels() {
        let parsed: FilterSet =
            serde_json::from_str(r#"{"level2":["EMEA"],"level1":["x"],"bogus":["y"]}"#).unwrap();
        assert_eq!(parsed, FilterSet::new().with_only(Level::L2, ["EMEA"]));
    }

    #[test]
    fn cascade_narrows_lower_levels() {
        let data = records();
        let set = FilterSet::new().with_only(Level::L2, ["EMEA"]);
        let options = cascade_options(&data, &set);
        assert_eq!(options.level2, vec!["AMER", "APAC", "EMEA"]);
        assert_eq!(options.level3, vec!["France", "Germany"]);
        assert_eq!(options.level4, vec!["Markets", "Retail"]);
        assert_eq!(options.level5, vec!["Hosting", "Network"]);
    }

    #[test]
    fn cascade_ignores_level5_selection() {
        let data = records();
        let set = FilterSet::new().with_only(Level::L5, ["Hosting"]);
        let options = cascade_options(&data, &set);
        assert_eq!(options.level5, vec!["Hosting", "Network", "Storage"]);
    }

    #[test]
    fn cascade_with_unknown_value_offers_nothing_below() {
        let data = records();
        let set = FilterSet::new().with_only(Level::L3, ["Atlantis"]);
        let options = cascade_options(&data, &set);
        assert_eq!(options.level3.len(), 4);
        assert!(options.level4.is_empty());
        assert!(options.level5.is_empty());
    }
}
