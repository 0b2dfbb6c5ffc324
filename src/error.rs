//! Error types for the viewer engine.

use thiserror::Error;

use crate::volume_loader::VolumeLoaderError;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Incoming volume has no samples, or no intensity range to normalize.
    #[error("Volume is empty or has a single uniform intensity")]
    EmptyVolume,

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Unsupported rotation order: {0}")]
    UnsupportedOrder(String),

    #[error("No volume loaded")]
    NoVolumeLoaded,

    #[error("No overlay volume loaded")]
    NoOverlayVolume,

    #[error("Rotation worker dropped before delivering a result")]
    WorkerCancelled,

    #[error(transparent)]
    Loader(#[from] VolumeLoaderError),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
