// ============================================================
// Crate Error Type
// ============================================================
// Every fallible library operation returns PrepError.
// The application layer wraps these in anyhow for context.
//
// Empty splits and identifiers without a vector are NOT errors.
// They are logged with tracing::warn! and counted in the
// AssemblyReport so a run can still complete.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library layers
pub type Result<T> = std::result::Result<T, PrepError>;

#[derive(Debug, Error)]
pub enum PrepError {
    /// A source file was read but its contents are malformed
    #[error("malformed input '{}': {reason}", path.display())]
    InputFormat { path: PathBuf, reason: String },

    /// The caption table header lacks a required column
    #[error("caption table '{}' has no '{column}' column", path.display())]
    MissingColumn { path: PathBuf, column: String },

    /// Two vectors in the same store have different lengths
    #[error("vector for '{id}' has length {found}, expected {expected}")]
    DimensionMismatch {
        id:       String,
        expected: usize,
        found:    usize,
    },

    #[error("cannot access '{}': {source}", path.display())]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("cannot build {n_splits} folds from {n_samples} identifiers")]
    InvalidFolds { n_splits: usize, n_samples: usize },
}

impl PrepError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn input_format(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InputFormat { path: path.into(), reason: reason.into() }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_missing_column_names_path_and_column() {
        let e = PrepError::MissingColumn {
            path:   PathBuf::from("data/captions.tsv"),
            column: "caption".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("data/captions.tsv"));
        assert!(msg.contains("caption"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let e = PrepError::io(
            "missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert!(e.source().is_some());
        assert!(e.to_string().contains("missing.json"));
    }
}
