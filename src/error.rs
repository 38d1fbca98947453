use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading and parsing the dataset sources
#[derive(Debug, Error)]
pub enum DatasetError {
    /// HTTP request for a remote source failed
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Remote source answered with a non-success status
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// Local source could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV decoding failed
    #[error("failed to parse CSV {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Table has no header row with the join column
    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    /// Boundary source is not valid GeoJSON
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] simd_json::Error),

    /// Boundary source parsed, but is not a FeatureCollection
    #[error("boundary source is not a FeatureCollection")]
    NotFeatureCollection,
}

/// Result type for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;
