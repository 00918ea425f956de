//! Dataset loading.
//!
//! This module fetches the columnar scheme dataset from a local file or a
//! remote URL and transposes it into records.

pub mod columnar;
pub mod fetch;

pub use columnar::ColumnarDataset;
pub use fetch::{load_or_empty, Source};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dataset has no {0} column")]
    MissingColumn(&'static str),
}
