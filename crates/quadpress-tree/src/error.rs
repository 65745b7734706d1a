//! Error types for quadpress-tree

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building, saving or calibrating a quadtree
#[derive(Debug, Error)]
pub enum TreeError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] quadpress_core::Error),

    /// Raster decode or encode failure
    #[error("image I/O error: {0}")]
    Image(#[from] quadpress_io::IoError),

    /// Filesystem error outside the codecs (temporary files, metadata)
    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    /// Invalid parameters: negative threshold, zero block size, unknown
    /// method id, target ratio outside `[0, 1]`
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A file size needed for a ratio could not be obtained
    #[error("size of '{}' unavailable: {message}", .path.display())]
    SizeUnavailable { path: PathBuf, message: String },

    /// No calibration iteration produced a measurable output file
    #[error("calibration unresolved: all {attempted} iterations failed")]
    CalibrationUnresolved { attempted: u32 },
}

impl TreeError {
    /// Check whether this error reports a caller-supplied bad argument
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, TreeError::InvalidParameters(_))
    }
}

/// Result type for quadtree operations
pub type TreeResult<T> = Result<T, TreeError>;
