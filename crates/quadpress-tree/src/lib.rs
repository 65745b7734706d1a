//! quadpress-tree - Quadtree image simplification
//!
//! This crate decomposes an RGB raster into a quadtree whose leaves are
//! flat-colored blocks:
//!
//! - **Metrics** - variance, mean absolute deviation, max difference,
//!   entropy and SSIM scores for a region
//! - **Decomposition** - recursive quadrant splitting until a region is
//!   homogeneous or too small
//! - **Reconstruction** - painting leaves back into a raster and saving it
//! - **Compression report** - on-disk size of the result against the source
//! - **Calibration** - binary search for the threshold hitting a size ratio
//!
//! # Examples
//!
//! ```
//! use quadpress_core::{Raster, RasterMut, Rect};
//! use quadpress_tree::{DecomposeOptions, ErrorMetric, QuadTree};
//!
//! let mut img = RasterMut::new(64, 64).unwrap();
//! img.fill_rect(&Rect::new(0, 0, 32, 32), [255, 0, 0]);
//! img.fill_rect(&Rect::new(32, 0, 32, 32), [0, 255, 0]);
//! img.fill_rect(&Rect::new(0, 32, 32, 32), [0, 0, 255]);
//! img.fill_rect(&Rect::new(32, 32, 32, 32), [255, 255, 255]);
//! let img: Raster = img.into();
//!
//! let options = DecomposeOptions::new(ErrorMetric::Variance).with_threshold(0.0);
//! let tree = QuadTree::new(&img, options).unwrap();
//! assert_eq!(tree.stats().leaves, 4);
//! assert_eq!(tree.stats().depth, 1);
//! assert_eq!(tree.render().unwrap(), img);
//! ```

pub mod calibrate;
pub mod error;
pub mod metric;
pub mod node;
pub mod report;
pub mod tree;

pub use calibrate::{
    Calibration, CalibrationOptions, find_threshold_for_ratio, find_threshold_for_ratio_with,
};
pub use error::{TreeError, TreeResult};
pub use metric::{
    ErrorMetric, Polarity, entropy, max_difference, mean_absolute_deviation, region_mean, ssim,
    ssim_against_color, variance,
};
pub use node::{Leaves, QuadNode};
pub use report::{CompressionReport, compression_report};
pub use tree::{DecomposeOptions, QuadTree, TreeStats};
