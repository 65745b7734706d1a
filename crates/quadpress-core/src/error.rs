//! Error types for quadpress-core
//!
//! Provides a unified error type for raster construction and region
//! handling. Out-of-range pixel access is not represented here: the
//! accessors used by the decomposition engine treat it as a contract
//! violation and panic instead.

use thiserror::Error;

/// quadpress-core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Sample buffer does not match the declared dimensions
    #[error("sample buffer length mismatch: expected {expected} bytes, got {actual}")]
    DataLength { expected: usize, actual: usize },
}

/// Result type alias for quadpress-core operations
pub type Result<T> = std::result::Result<T, Error>;
