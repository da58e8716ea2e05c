//! Error types
//!
//! Only retrieval failures abort a load. Malformed rows, bad search
//! patterns and degenerate statistics degrade to emptier results instead.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve the raw text of one split
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    #[error("no source configured for split `{0}`")]
    UnknownSplit(String),

    #[error("{0}")]
    Other(String),
}

/// Failure of a multi-split load
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load split `{split}`: {source}")]
    Retrieval {
        split: String,
        #[source]
        source: FetchError,
    },
}

impl LoadError {
    /// Name of the split whose retrieval failed
    pub fn split(&self) -> &str {
        match self {
            LoadError::Retrieval { split, .. } => split,
        }
    }
}

/// A search pattern that could not be turned into a matcher
#[derive(Debug, Error)]
#[error("invalid search pattern `{pattern}`: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A name that is not an association measure
#[derive(Debug, Error)]
#[error("unknown association measure `{0}` (expected `pmi` or `t-score`)")]
pub struct UnknownMeasure(pub String);

/// Failure to read a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid split glob: {0}")]
    Glob(#[from] glob::PatternError),
}
