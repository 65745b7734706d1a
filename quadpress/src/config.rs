//! Validated run configuration and the end-to-end pipeline

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use quadpress_io::ImageFormat;
use quadpress_tree::{
    Calibration, CalibrationOptions, CompressionReport, DecomposeOptions, ErrorMetric, QuadTree,
    TreeError, TreeResult, TreeStats,
};
use tracing::info;

/// How the threshold is chosen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    /// Use a fixed threshold and minimum block size
    Threshold { threshold: f64, min_block_size: u32 },
    /// Search for the threshold saving this fraction of the source size,
    /// in `(0, 1]`; blocks go down to one pixel
    TargetCompression(f64),
}

/// Everything one simplification run needs
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub metric: ErrorMetric,
    pub mode: Mode,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Threshold the tree was built with
    pub threshold: f64,
    /// Calibration details in target-compression mode
    pub calibration: Option<Calibration>,
    pub stats: TreeStats,
    pub report: CompressionReport,
    pub elapsed: Duration,
}

/// `<dir>/<stem>_quadtree.png` beside `input`
pub fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{stem}_quadtree.png"))
}

impl RunConfig {
    /// Build and validate a configuration; `output` defaults to
    /// [`default_output`]
    pub fn new(
        input: PathBuf,
        output: Option<PathBuf>,
        metric: ErrorMetric,
        mode: Mode,
    ) -> TreeResult<Self> {
        let output = output.unwrap_or_else(|| default_output(&input));
        let config = RunConfig {
            input,
            output,
            metric,
            mode,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every argument before any file is touched
    pub fn validate(&self) -> TreeResult<()> {
        match self.mode {
            Mode::Threshold {
                threshold,
                min_block_size,
            } => {
                DecomposeOptions::new(self.metric)
                    .with_threshold(threshold)
                    .with_min_block_size(min_block_size)
                    .validate()?;
                if threshold > self.metric.upper_bound() {
                    return Err(TreeError::InvalidParameters(format!(
                        "threshold {threshold} exceeds the {} maximum of {}",
                        self.metric,
                        self.metric.upper_bound()
                    )));
                }
            }
            Mode::TargetCompression(c) => {
                if !(c > 0.0 && c <= 1.0) {
                    return Err(TreeError::InvalidParameters(format!(
                        "target compression must be in (0, 1], got {c}"
                    )));
                }
            }
        }
        self.output_format()?;
        Ok(())
    }

    /// Format selected by the output extension
    pub fn output_format(&self) -> TreeResult<ImageFormat> {
        Ok(ImageFormat::from_path(&self.output)?)
    }

    /// Load, optionally calibrate, decompose, save and measure
    pub fn run(&self) -> TreeResult<RunSummary> {
        let start = Instant::now();
        let format = self.output_format()?;
        let raster = quadpress_io::read_image(&self.input)?;
        info!(
            input = %self.input.display(),
            width = raster.width(),
            height = raster.height(),
            "loaded source"
        );

        let (options, calibration) = match self.mode {
            Mode::Threshold {
                threshold,
                min_block_size,
            } => {
                let options = DecomposeOptions::new(self.metric)
                    .with_threshold(threshold)
                    .with_min_block_size(min_block_size);
                (options, None)
            }
            Mode::TargetCompression(c) => {
                let mut cal_options = CalibrationOptions::new().with_format(format);
                if let Some(dir) = self.output.parent().filter(|d| !d.as_os_str().is_empty()) {
                    cal_options = cal_options.with_temp_dir(dir);
                }
                let cal = quadpress_tree::find_threshold_for_ratio_with(
                    &self.input,
                    self.metric,
                    1.0 - c,
                    &cal_options,
                )?;
                let options = DecomposeOptions::new(self.metric).with_threshold(cal.threshold);
                (options, Some(cal))
            }
        };

        let tree = QuadTree::new(&raster, options)?;
        tree.save_as(&self.output, format)?;
        let report = tree.compression_ratio(&self.input, &self.output)?;

        let summary = RunSummary {
            threshold: options.threshold,
            calibration,
            stats: tree.stats(),
            report,
            elapsed: start.elapsed(),
        };
        info!(
            output = %self.output.display(),
            leaves = summary.stats.leaves,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "run complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn threshold_mode(threshold: f64, min_block_size: u32) -> Mode {
        Mode::Threshold {
            threshold,
            min_block_size,
        }
    }

    #[test]
    fn test_default_output() {
        assert_eq!(
            default_output(Path::new("/data/photo.jpg")),
            PathBuf::from("/data/photo_quadtree.png")
        );
        assert_eq!(
            default_output(Path::new("scan.v2.bmp")),
            PathBuf::from("scan.v2_quadtree.png")
        );
    }

    #[test]
    fn test_threshold_bounds() {
        let input = PathBuf::from("in.png");
        for metric in ErrorMetric::ALL {
            let max = metric.upper_bound();
            assert!(RunConfig::new(input.clone(), None, metric, threshold_mode(max, 1)).is_ok());
            let over = RunConfig::new(input.clone(), None, metric, threshold_mode(max * 1.01, 1));
            assert!(over.unwrap_err().is_invalid_argument(), "{metric}");
        }
        let entropy = |mode| RunConfig::new(input.clone(), None, ErrorMetric::Entropy, mode);
        assert!(entropy(threshold_mode(-1.0, 1)).unwrap_err().is_invalid_argument());
        assert!(entropy(threshold_mode(1.0, 0)).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_target_compression_range() {
        let config = |c| {
            RunConfig::new(
                PathBuf::from("in.png"),
                None,
                ErrorMetric::Ssim,
                Mode::TargetCompression(c),
            )
        };
        for c in [0.0, -0.5, 1.5, f64::NAN] {
            assert!(config(c).unwrap_err().is_invalid_argument(), "{c}");
        }
        for c in [0.01, 0.5, 1.0] {
            assert!(config(c).is_ok());
        }
    }

    #[test]
    fn test_output_extension_checked() {
        let config = RunConfig::new(
            PathBuf::from("in.png"),
            Some(PathBuf::from("out.gif")),
            ErrorMetric::Variance,
            threshold_mode(10.0, 1),
        );
        assert!(matches!(config, Err(TreeError::Image(_))));
    }
}
