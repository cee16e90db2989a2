use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the JSON record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file is missing or could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file was read but does not hold a JSON array of objects.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The updated list could not be written back.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A directory could not be enumerated.
    #[error("failed to list {}: {source}", .path.display())]
    Enumerate {
        /// Directory that was being listed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The last id in the list leaves no room for another one.
    #[error("no id left after {last}")]
    IdExhausted {
        /// Id of the last record.
        last: i64,
    },

    /// No record carries the requested id.
    #[error("record {id} not found")]
    NotFound {
        /// The id as it was requested.
        id: String,
    },
}

impl StoreError {
    /// True for [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// True when the list was read but the change could not be stored.
    pub fn is_write(&self) -> bool {
        matches!(self, StoreError::Write { .. } | StoreError::IdExhausted { .. })
    }
}
