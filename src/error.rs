use std::path::PathBuf;

use thiserror::Error;

use crate::domain::GeometryError;

/// Setup failures. Growth itself never fails; these abort a run before
/// the first layer is grown.
#[derive(Debug, Error)]
pub enum GrowthError {
    #[error("grid of {cols}x{rows} cells exceeds the ceiling of {limit} cells")]
    GridTooLarge { cols: u64, rows: u64, limit: u64 },
    #[error("boundary is unusable: {0}")]
    Boundary(#[from] GeometryError),
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),
    #[error("no start group has a cell inside the allowed area")]
    NoStartCells,
    #[error("no layers to grow")]
    NoLayers,
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),
}
