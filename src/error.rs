use std::path::PathBuf;

use thiserror::Error;

/// Problems with the region dataset. All of these are fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch dataset {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("dataset is not a valid GeoJSON FeatureCollection: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("feature {index} has no 'name' string property")]
    MissingName { index: usize },

    #[error("feature {index} ({name}) has unsupported geometry type '{kind}'")]
    UnsupportedGeometry {
        index: usize,
        name: String,
        kind: String,
    },

    #[error("feature {index} ({name}) has an empty boundary")]
    EmptyBoundary { index: usize, name: String },

    #[error("dataset contains no regions")]
    Empty,
}

/// Why the selection controller could not be set up.
///
/// Either way the map stays viewable; only interaction is disabled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("map was not available after {attempts} attempts")]
    MapUnavailable { attempts: u32 },

    #[error("map has no region shapes to attach to")]
    NoRegions,
}

/// Failure while assembling a page for one request.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to serialize map document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("page assembly task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
