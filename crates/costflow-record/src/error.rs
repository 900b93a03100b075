//! Error types for record loading
//!
//! Loading is the only fallible step: once a [`crate::RecordStore`] exists,
//! every downstream computation over it is infallible.

use std::path::PathBuf;

/// Errors while loading a record set
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error opening the source file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV (bad header, wrong column count, unparsable cost)
    #[error("csv error: {source}")]
    Csv {
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    /// Cost is NaN or infinite
    #[error("non-finite cost at line {line}")]
    NonFiniteCost { line: u64 },
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for LoadError {
    fn from(source: csv::Error) -> Self {
        Self::Csv {
            line: source.position().map(csv::Position::line),
            source,
        }
    }
}
