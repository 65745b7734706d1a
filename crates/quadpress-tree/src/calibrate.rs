//! Threshold calibration
//!
//! Binary search for the threshold whose reconstruction, written to disk,
//! lands closest to a requested `produced / original` size ratio. Each
//! trial decomposes the source with 1-pixel minimum blocks, writes the
//! rendering to a temporary file in the working directory (or in
//! [`CalibrationOptions::temp_dir`]) and measures it. Temporary files are
//! removed when the trial finishes.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{TreeError, TreeResult};
use crate::metric::{ErrorMetric, Polarity};
use crate::tree::{DecomposeOptions, QuadTree};
use quadpress_core::Raster;
use quadpress_io::ImageFormat;
use tracing::{debug, info, warn};

/// Search limits for [`find_threshold_for_ratio_with`]
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationOptions {
    /// Maximum number of trials
    pub max_iterations: u32,
    /// Stop once the search interval is at most this wide
    pub tolerance: f64,
    /// Format for the trial files; detected from the source when `None`
    pub format: Option<ImageFormat>,
    /// Directory for trial files; the working directory when `None`
    pub temp_dir: Option<PathBuf>,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            tolerance: 0.01,
            format: None,
            temp_dir: None,
        }
    }
}

impl CalibrationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }
}

/// Outcome of a calibration run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Best threshold found
    pub threshold: f64,
    /// `produced / original` measured at that threshold
    pub achieved_ratio: f64,
    /// `|achieved_ratio - target|`
    pub error: f64,
    /// Trials attempted
    pub iterations: u32,
    /// Trials that produced a measurable file
    pub succeeded: u32,
}

/// Search with default limits: 15 trials, interval width 0.01.
///
/// See [`find_threshold_for_ratio_with`].
pub fn find_threshold_for_ratio<P: AsRef<Path>>(
    source: P,
    metric: ErrorMetric,
    target_ratio: f64,
) -> TreeResult<Calibration> {
    find_threshold_for_ratio_with(source, metric, target_ratio, &CalibrationOptions::default())
}

/// Find the threshold whose output size ratio is closest to `target_ratio`.
///
/// The search runs over `[0, metric.upper_bound()]`. For error metrics a
/// ratio below target means the threshold is too high; for SSIM it means
/// the threshold is too low. A trial that fails to decompose, encode or
/// measure is logged and skipped.
///
/// # Errors
///
/// - [`TreeError::InvalidParameters`] if `target_ratio` is outside `[0, 1]`
/// - [`TreeError::SizeUnavailable`] if the source size cannot be read
/// - [`TreeError::Image`] if the source cannot be decoded
/// - [`TreeError::CalibrationUnresolved`] if every trial failed
pub fn find_threshold_for_ratio_with<P: AsRef<Path>>(
    source: P,
    metric: ErrorMetric,
    target_ratio: f64,
    options: &CalibrationOptions,
) -> TreeResult<Calibration> {
    if !(0.0..=1.0).contains(&target_ratio) {
        return Err(TreeError::InvalidParameters(format!(
            "target ratio must be in [0, 1], got {target_ratio}"
        )));
    }
    let source = source.as_ref();
    let original_bytes = match fs::metadata(source) {
        Ok(meta) if meta.len() > 0 => meta.len(),
        Ok(_) => {
            return Err(TreeError::SizeUnavailable {
                path: source.to_path_buf(),
                message: "file is empty".to_string(),
            });
        }
        Err(e) => {
            return Err(TreeError::SizeUnavailable {
                path: source.to_path_buf(),
                message: e.to_string(),
            });
        }
    };

    let raster = quadpress_io::read_image(source)?;
    let format = match options.format {
        Some(format) => format,
        None => quadpress_io::detect_format(source)?,
    };
    let dir = options
        .temp_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut low = 0.0f64;
    let mut high = metric.upper_bound();
    let mut best: Option<Calibration> = None;
    let mut attempted = 0u32;
    let mut succeeded = 0u32;

    while attempted < options.max_iterations && high - low > options.tolerance {
        let mid = (low + high) / 2.0;
        attempted += 1;

        let produced = match trial(&raster, metric, mid, format, &dir) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(iteration = attempted, threshold = mid, error = %e, "calibration trial skipped");
                continue;
            }
        };
        succeeded += 1;

        let ratio = produced as f64 / original_bytes as f64;
        let error = (ratio - target_ratio).abs();
        debug!(
            iteration = attempted,
            threshold = mid,
            ratio,
            error,
            "calibration trial"
        );
        if best.is_none_or(|b| error < b.error) {
            best = Some(Calibration {
                threshold: mid,
                achieved_ratio: ratio,
                error,
                iterations: 0,
                succeeded: 0,
            });
        }

        let too_small = ratio < target_ratio;
        match (metric.polarity(), too_small) {
            (Polarity::LowerIsHomogeneous, true) | (Polarity::HigherIsHomogeneous, false) => {
                high = mid
            }
            (Polarity::LowerIsHomogeneous, false) | (Polarity::HigherIsHomogeneous, true) => {
                low = mid
            }
        }
    }

    let best = best.ok_or(TreeError::CalibrationUnresolved { attempted })?;
    let calibration = Calibration {
        iterations: attempted,
        succeeded,
        ..best
    };
    info!(
        %metric,
        target = target_ratio,
        threshold = calibration.threshold,
        achieved = calibration.achieved_ratio,
        iterations = attempted,
        "calibration finished"
    );
    Ok(calibration)
}

/// Decompose at `threshold`, write the rendering to a temporary file and
/// return its size in bytes
fn trial(
    raster: &Raster,
    metric: ErrorMetric,
    threshold: f64,
    format: ImageFormat,
    dir: &Path,
) -> TreeResult<u64> {
    let options = DecomposeOptions::new(metric)
        .with_threshold(threshold)
        .with_min_block_size(1);
    let rendered = QuadTree::new(raster, options)?.render()?;

    let mut temp = tempfile::Builder::new()
        .prefix(".quadpress-calibrate-")
        .suffix(&format!(".{}", format.extension()))
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        quadpress_io::write_image_writer(&rendered, &mut writer, format)?;
        writer.flush()?;
    }
    let bytes = temp.as_file().metadata()?.len();
    if let Err(e) = temp.close() {
        warn!(error = %e, "failed to remove calibration trial file");
    }
    Ok(bytes)
}
