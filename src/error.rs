//! Dataset-level failures.
//!
//! Every variant ends a pipeline run in the error state. Per-record defects
//! are not errors; see [`crate::layers::Rejection`].

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("HTTP error! request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid dataset URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse sighting data: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LoadError>;
