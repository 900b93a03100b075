//! Read-only record store
//!
//! [`RecordStore`] is loaded once at startup and shared by reference count
//! afterwards. Cloning is cheap and never copies records.

use crate::error::LoadError;
use crate::fingerprint::DatasetFingerprint;
use crate::level::Level;
use crate::record::Record;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Immutable, shareable sequence of cost records
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[Record]>,
    fingerprint: DatasetFingerprint,
    skipped_rows: usize,
}

/// One CSV row as it appears on disk
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Level1", alias = "level1")]
    level1: String,
    #[serde(rename = "Level2", alias = "level2")]
    level2: String,
    #[serde(rename = "Level3", alias = "level3")]
    level3: String,
    #[serde(rename = "Level4", alias = "level4")]
    level4: String,
    #[serde(rename = "Level5", alias = "level5")]
    level5: String,
    #[serde(rename = "Cost", alias = "cost")]
    cost: f64,
}

impl CsvRow {
    /// Convert to a record; `None` if a hierarchy value is blank
    fn into_record(self, line: u64) -> Result<Option<Record>, LoadError> {
        if !self.cost.is_finite() {
            return Err(LoadError::NonFiniteCost { line });
        }
        let levels = [self.level1, self.level2, self.level3, self.level4, self.level5];
        if let Some(pos) = levels.iter().position(String::is_empty) {
            tracing::warn!(
                line,
                level = %Level::ALL[pos],
                "skipping row with blank hierarchy value"
            );
            return Ok(None);
        }
        Ok(Some(Record::from_levels(levels, self.cost)))
    }
}

impl RecordStore {
    /// Wrap an in-memory record set
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        let fingerprint = DatasetFingerprint::of_records(&records);
        Self {
            records: records.into(),
            fingerprint,
            skipped_rows: 0,
        }
    }

    /// Load records from CSV text with a `Level1..Level5,Cost` header
    ///
    /// Rows with a blank hierarchy value are skipped and counted in
    /// [`RecordStore::skipped_rows`].
    ///
    /// # Errors
    /// Returns error on malformed CSV or non-finite costs
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut skipped_rows = 0;
        for (row_index, row) in reader.deserialize::<CsvRow>().enumerate() {
            // header occupies line 1
            let line = row_index as u64 + 2;
            match row?.into_record(line)? {
                Some(record) => records.push(record),
                None => skipped_rows += 1,
            }
        }

        let mut store = Self::new(records);
        store.skipped_rows = skipped_rows;
        Ok(store)
    }

    /// Load records from a CSV file
    ///
    /// # Errors
    /// Returns error if the file cannot be opened or its contents are invalid
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LoadError::io_error(path, e))?;
        let store = Self::from_csv_reader(file)?;
        tracing::info!(
            path = %path.display(),
            records = store.len(),
            skipped = store.skipped_rows,
            fingerprint = %store.fingerprint.short(),
            "loaded record store"
        );
        Ok(store)
    }

    /// All records in load order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped during CSV loading for blank hierarchy values
    #[inline]
    #[must_use]
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Fingerprint of the loaded data
    #[inline]
    #[must_use]
    pub fn fingerprint(&self) -> DatasetFingerprint {
        self.fingerprint
    }

    /// Sorted distinct values at a level
    #[must_use]
    pub fn distinct_values(&self, level: Level) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.level(level))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl From<Vec<Record>> for RecordStore {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}
