//! Error types for the terradb library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building a terrain database.
///
/// Most variants describe a problem with one survey input and are handled as
/// per-file skips by the batch driver; only I/O failures on the database
/// directory itself abort a run.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// IO error when reading or writing files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required key was missing from a survey header file.
    #[error("Survey header missing required field: {field}")]
    MissingField { field: &'static str },

    /// A survey header field could not be parsed.
    #[error("Invalid survey header field {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// Survey grid dimensions don't match the expected source layout.
    #[error("Unexpected survey dimensions: {rows}x{cols} (expected {expected}x{expected})")]
    GridDimension {
        rows: usize,
        cols: usize,
        expected: usize,
    },

    /// The survey data file is smaller than its header declares.
    #[error("Short read in survey data: {actual} bytes (need {expected})")]
    ShortRead { expected: usize, actual: usize },

    /// A survey filename doesn't encode a valid block.
    #[error("Filename does not name a terrain block: {path}")]
    BadBlockName { path: PathBuf },

    /// A database file header failed validation.
    #[error("Corrupt database header: {reason}")]
    CorruptHeader { reason: &'static str },
}

/// Result type alias using [`TerrainError`].
pub type Result<T> = std::result::Result<T, TerrainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TerrainError::GridDimension {
            rows: 1200,
            cols: 1212,
            expected: 1212,
        };
        assert!(err.to_string().contains("1200x1212"));

        let err = TerrainError::ShortRead {
            expected: 5875776,
            actual: 1024,
        };
        assert!(err.to_string().contains("1024"));

        let err = TerrainError::BadBlockName {
            path: PathBuf::from("readme.txt"),
        };
        assert!(err.to_string().contains("readme.txt"));
    }
}
