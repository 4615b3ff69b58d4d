use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by a document store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode or decode collection '{collection}': {source}")]
    Serde {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Store has been closed")]
    Closed,
}

/// Errors surfaced by the launch and planet operations
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{0}")]
    NotFound(String),

    #[error("No flight number left after {0}")]
    FlightNumbersExhausted(u32),

    #[error("Launch data download failed: {0}")]
    UpstreamFetchFailed(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, LaunchError>;
