//! quadpress-test - Regression test framework for quadpress
//!
//! This crate provides the harness shared by the `tests/*_reg.rs` suites:
//!
//! - [`RegParams`] counts numbered checks, records every failure and
//!   reports them together at [`RegParams::cleanup`]
//! - [`synth`] builds deterministic synthetic rasters
//!
//! # Usage
//!
//! ```ignore
//! use quadpress_test::RegParams;
//!
//! let mut rp = RegParams::new("quadtree");
//! rp.compare_values(4.0, stats.leaves as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "display" to write rendered rasters under
//!   `tests/regout` for visual inspection

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

/// Load an image through the regular decoder, mapping failures to
/// [`TestError::ImageLoad`].
pub fn load_image<P: AsRef<std::path::Path>>(path: P) -> TestResult<quadpress_core::Raster> {
    let path = path.as_ref();
    quadpress_io::read_image(path).map_err(|e| TestError::ImageLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // quadpress-test is at crates/quadpress-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
