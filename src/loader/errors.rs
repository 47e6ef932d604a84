//! # Loader Errors

use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors raised while reading workload input files
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Wraps an error with the file it came from
    #[error("{path}: {source}")]
    File {
        path: String,
        #[source]
        source: Box<LoaderError>,
    },

    /// Well-formed JSON with an unusable value
    #[error("Invalid {what}: {reason}")]
    Invalid { what: String, reason: String },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },
}

impl LoaderError {
    pub fn invalid(what: impl Into<String>, reason: impl Into<String>) -> Self {
        LoaderError::Invalid {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn in_file(path: impl Into<String>, source: LoaderError) -> Self {
        LoaderError::File {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
