//! Testing utilities for costflow workspace
//!
//! Shared fixtures, CSV helpers and proptest strategies.

#![allow(missing_docs)]

use costflow_record::{Record, RecordStore};
use proptest::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

/// CSV header expected by the record loader
pub const CSV_HEADER: &str = "Level1,Level2,Level3,Level4,Level5,Cost";

/// The two-leaf fixture: `A>B>C>D>E = 100`, `A>B>C>D>F = 50`
pub fn two_leaf_records() -> Vec<Record> {
    vec![
        Record::new("A", "B", "C", "D", "E", 100.0),
        Record::new("A", "B", "C", "D", "F", 50.0),
    ]
}

/// A small bank-like cost table with integer costs
pub fn sample_records() -> Vec<Record> {
    const ROWS: &[(&str, &str, &str, &str, f64)] = &[
        ("EMEA", "Germany", "Retail Banking", "Cloud Hosting", 1200.0),
        ("EMEA", "Germany", "Retail Banking", "Network", 300.0),
        ("EMEA", "Germany", "Investment Banking", "Market Data", 2500.0),
        ("EMEA", "France", "Retail Banking", "Cloud Hosting", 800.0),
        ("EMEA", "France", "Asset Management", "Licences", 450.0),
        ("EMEA", "UK", "Investment Banking", "Market Data", 3100.0),
        ("EMEA", "UK", "Investment Banking", "Cloud Hosting", 900.0),
        ("APAC", "Japan", "Investment Banking", "Market Data", 1700.0),
        ("APAC", "Singapore", "Asset Management", "Licences", 600.0),
        ("APAC", "India", "Retail Banking", "Network", 250.0),
        ("AMER", "USA", "Investment Banking", "Market Data", 4200.0),
        ("AMER", "USA", "Asset Management", "Cloud Hosting", 1100.0),
        ("AMER", "Brazil", "Retail Banking", "Network", 150.0),
    ];

    ROWS.iter()
        .map(|&(l2, l3, l4, l5, cost)| Record::new("Deutsche Bank", l2, l3, l4, l5, cost))
        .collect()
}

/// [`sample_records`] wrapped in a store
pub fn sample_store() -> RecordStore {
    RecordStore::new(sample_records())
}

/// Render records as loader-compatible CSV text
pub fn to_csv(records: &[Record]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&record.levels().join(","));
        out.push(',');
        out.push_str(&record.cost().to_string());
        out.push('\n');
    }
    out
}

/// Write records to a temporary CSV file
pub fn csv_file(records: &[Record]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(to_csv(records).as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Arbitrary record drawn from small vocabularies so groups collide
///
/// `Shared` appears at both level 2 and level 4; costs are whole numbers so
/// sums are exact in `f64`.
pub fn arb_record() -> impl Strategy<Value = Record> {
    (
        prop::sample::select(vec!["Root", "Other Root"]),
        prop::sample::select(vec!["EMEA", "APAC", "AMER", "Shared"]),
        prop::sample::select(vec!["Germany", "France", "Japan", "USA", "Brazil"]),
        prop::sample::select(vec!["Retail", "Markets", "Shared"]),
        prop::sample::select(vec!["Hosting", "Network", "Licences", "Data"]),
        0u32..10_000,
    )
        .prop_map(|(l1, l2, l3, l4, l5, cost)| Record::new(l1, l2, l3, l4, l5, f64::from(cost)))
}

/// Arbitrary record with a fractional cost, same vocabularies as [`arb_record`]
pub fn arb_fractional_record() -> impl Strategy<Value = Record> {
    (arb_record(), 0.0f64..1_000_000.0)
        .prop_map(|(record, cost)| Record::from_levels(record.levels().clone(), cost))
}

/// Arbitrary record set of up to `max` records with fractional costs
pub fn arb_fractional_records(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_fractional_record(), 0..=max)
}

/// Arbitrary record set of up to `max` records
pub fn arb_records(max: usize) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..=max)
}

/// Arbitrary subset of the level-2 vocabulary used by [`arb_record`]
pub fn arb_level2_selection() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(vec!["EMEA", "APAC", "AMER", "Shared", "Mars"], 0..=5)
}

/// Arbitrary subset of the level-3 vocabulary used by [`arb_record`]
pub fn arb_level3_selection() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(vec!["Germany", "France", "Japan", "USA", "Brazil"], 0..=5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_fixture_loads() {
        let file = csv_file(&sample_records());
        let store = RecordStore::from_csv_path(file.path()).unwrap();
        assert_eq!(store.records(), sample_records().as_slice());
    }
}
