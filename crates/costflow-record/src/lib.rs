//! costflow Record Store
//!
//! Immutable hierarchical cost records loaded once at startup.
//!
//! # Core Concepts
//!
//! - [`Record`]: One leaf cost entry with five hierarchy values and a cost
//! - [`Level`]: The five ordinal hierarchy columns (root `L1` to leaf `L5`)
//! - [`RecordStore`]: Read-only, cheaply clonable record sequence
//! - [`DatasetFingerprint`]: Blake3 digest identifying a loaded record set
//!
//! # Example
//!
//! ```rust,ignore
//! use costflow_record::{Level, RecordStore};
//!
//! let store = RecordStore::from_csv_path("costs.csv")?;
//! println!("{} records, fingerprint {}", store.len(), store.fingerprint().short());
//! println!("regions: {:?}", store.distinct_values(Level::L2));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod fingerprint;
mod level;
mod record;
mod store;

pub use error::LoadError;
pub use fingerprint::{DatasetFingerprint, FingerprintError};
pub use level::{Level, LevelParseError};
pub use record::Record;
pub use store::RecordStore;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn store_fingerprint_matches_records() {
        let records = vec![
            Record::new("A", "B", "C", "D", "E", 100.0),
            Record::new("A", "B", "C", "D", "F", 50.0),
        ];
        let expected = DatasetFingerprint::of_records(&records);
        let store = RecordStore::new(records);
        assert_eq!(store.fingerprint(), expected);
    }

    #[test]
    fn csv_and_in_memory_agree() {
        let csv = "Level1,Level2,Level3,Level4,Level5,Cost\nA,B,C,D,E,100\nA,B,C,D,F,50\n";
        let loaded = RecordStore::from_csv_reader(csv.as_bytes()).unwrap();
        let built = RecordStore::new(vec![
            Record::new("A", "B", "C", "D", "E", 100.0),
            Record::new("A", "B", "C", "D", "F", 50.0),
        ]);
        assert_eq!(loaded.records(), built.records());
        assert_eq!(loaded.fingerprint(), built.fingerprint());
        assert_eq!(loaded.distinct_values(Level::L5), vec!["E", "F"]);
    }
}
