// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Fatal errors of a catalog run.
///
/// Rows that fail to parse are not errors: they are dropped where they are
/// read and only show up in the statistics.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Every acquisition candidate failed.
    #[error("all {attempts} catalog sources failed")]
    SourceExhausted { attempts: usize },

    /// The downloaded artifact could not be decompressed.
    #[error("corrupt artifact {path}: {source}")]
    CorruptArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file the current stage expects from a previous one is absent.
    #[error("missing input file: {path}")]
    MissingInputFile { path: PathBuf },

    /// A configured candidate is not a usable HTTP(S) URL.
    #[error("invalid source {url}: {reason}")]
    InvalidSource { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
