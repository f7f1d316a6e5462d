//! Error taxonomy for the reconstruction pipeline.
//!
//! Configuration and data errors abort a run before any per-pixel work.
//! Per-pixel numerical degeneracies are never reported here; they are
//! recorded in the output rasters and counted in the
//! [`ReconstructionReport`](crate::diagnostics::ReconstructionReport).
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("at least {required} light samples are required, got {count}")]
    TooFewLights { count: usize, required: usize },

    #[error(
        "light sample {index} has size {}x{}, expected {}x{}",
        .found.0, .found.1, .expected.0, .expected.1
    )]
    DimensionMismatch {
        index: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("{images} images supplied for a light matrix built from {lights} directions")]
    SampleCountMismatch { lights: usize, images: usize },

    #[error("light sample {index} has an empty image")]
    EmptyImage { index: usize },

    #[error("light sample {index} has a zero-length or non-finite direction")]
    InvalidDirection { index: usize },

    #[error("singular value decomposition failed: {0}")]
    Decomposition(String),

    #[error("cannot load {}: {reason}", .path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    #[error("light descriptor line {line}: {reason}")]
    Descriptor { line: usize, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
