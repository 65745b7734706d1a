//! quadpress - Lossy image simplification with quadtrees
//!
//! Facade over the workspace crates:
//!
//! - [`raster`] - RGB rasters and rectangles
//! - [`io`] - PNG, JPEG and BMP reading and writing
//! - [`tree`] - metrics, decomposition, reconstruction and calibration
//!
//! plus [`RunConfig`], the validated load → decompose → save → report
//! pipeline behind the `quadpress` binary.
//!
//! # Example
//!
//! ```
//! use quadpress::{ErrorMetric, Mode, RunConfig};
//! use std::path::PathBuf;
//!
//! let config = RunConfig::new(
//!     PathBuf::from("photo.jpg"),
//!     None,
//!     ErrorMetric::Ssim,
//!     Mode::TargetCompression(0.5),
//! )
//! .unwrap();
//! assert_eq!(config.output, PathBuf::from("photo_quadtree.png"));
//! ```

pub mod config;

pub use config::{Mode, RunConfig, RunSummary, default_output};
pub use quadpress_core::{Raster, RasterMut, Rect};
pub use quadpress_io::ImageFormat;
pub use quadpress_tree::{
    Calibration, CompressionReport, DecomposeOptions, ErrorMetric, QuadNode, QuadTree, TreeError,
    TreeResult, TreeStats,
};

pub use quadpress_core as raster;
pub use quadpress_io as io;
pub use quadpress_tree as tree;
