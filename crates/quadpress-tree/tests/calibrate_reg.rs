//! Threshold calibration regression test
//!
//! Covers:
//! 1. A zero target drives error metrics toward their upper bound and
//!    SSIM toward zero
//! 2. The returned threshold reproduces the reported ratio
//! 3. Calibration through a different trial format
//! 4. Argument and source validation
//!
//! Run with:
//! ```
//! cargo test -p quadpress-tree --test calibrate_reg
//! ```

use std::path::{Path, PathBuf};

use quadpress_io::ImageFormat;
use quadpress_test::RegParams;
use quadpress_test::synth;
use quadpress_tree::{
    CalibrationOptions, DecomposeOptions, ErrorMetric, QuadTree, TreeError,
    find_threshold_for_ratio_with,
};

fn write_source(dir: &Path, name: &str, format: ImageFormat) -> PathBuf {
    let path = dir.join(name);
    quadpress_io::write_image(&synth::waves(48, 40), &path, format).expect("write source");
    path
}

#[test]
fn calibrate_direction() {
    let mut rp = RegParams::new("calibrate_direction");

    let dir = tempfile::tempdir().expect("tempdir");
    let src = write_source(dir.path(), "waves.png", ImageFormat::Png);
    let options = CalibrationOptions::new().with_temp_dir(dir.path());

    for metric in ErrorMetric::ALL {
        let cal = find_threshold_for_ratio_with(&src, metric, 0.0, &options).expect("calibrate");
        eprintln!(
            "  {}: threshold={:.4} ratio={:.4} iterations={}",
            metric, cal.threshold, cal.achieved_ratio, cal.iterations
        );
        let half = metric.upper_bound() / 2.0;
        let toward_smaller = match metric {
            ErrorMetric::Ssim => cal.threshold <= half,
            _ => cal.threshold >= half,
        };
        rp.check(toward_smaller, metric.name());
        rp.check(cal.iterations >= 1 && cal.iterations <= 15, "iteration limit");
        rp.compare_values(cal.achieved_ratio, cal.error, 1e-12);
    }

    assert!(rp.cleanup(), "calibrate direction test failed");
}

#[test]
fn calibrate_reproducible_ratio() {
    let mut rp = RegParams::new("calibrate_reproduce");

    let dir = tempfile::tempdir().expect("tempdir");
    let src = write_source(dir.path(), "waves.png", ImageFormat::Png);
    let original_bytes = std::fs::metadata(&src).expect("metadata").len();
    let options = CalibrationOptions::new().with_temp_dir(dir.path());

    let cal = find_threshold_for_ratio_with(&src, ErrorMetric::Variance, 0.5, &options)
        .expect("calibrate");
    rp.compare_values((cal.achieved_ratio - 0.5).abs(), cal.error, 1e-12);
    rp.check(cal.succeeded == cal.iterations, "all trials succeeded");

    // Rebuilding at the returned threshold reproduces the measured size
    let raster = quadpress_io::read_image(&src).expect("read");
    let tree = QuadTree::new(
        &raster,
        DecomposeOptions::new(ErrorMetric::Variance).with_threshold(cal.threshold),
    )
    .expect("build");
    let out = dir.path().join("calibrated.png");
    tree.save(&out).expect("save");
    let report = tree.compression_ratio(&src, &out).expect("report");
    rp.compare_values(original_bytes as f64, report.original_bytes as f64, 0.0);
    rp.compare_values(cal.achieved_ratio, report.size_ratio(), 1e-12);

    assert!(rp.cleanup(), "calibrate reproduce test failed");
}

#[test]
fn calibrate_trial_format() {
    let mut rp = RegParams::new("calibrate_format");

    let dir = tempfile::tempdir().expect("tempdir");
    let src = write_source(dir.path(), "waves.bmp", ImageFormat::Bmp);

    // Trials default to the source format: a flat BMP is the same size
    // as the source, whatever the threshold
    let options = CalibrationOptions::new().with_temp_dir(dir.path());
    let cal = find_threshold_for_ratio_with(&src, ErrorMetric::MaxDifference, 0.5, &options)
        .expect("calibrate bmp");
    rp.compare_values(1.0, cal.achieved_ratio, 0.0);

    // PNG trials against a BMP source compress
    let options = options.with_format(ImageFormat::Png);
    let cal = find_threshold_for_ratio_with(&src, ErrorMetric::MaxDifference, 0.5, &options)
        .expect("calibrate png");
    rp.check(cal.achieved_ratio < 1.0, "png trials smaller than bmp source");

    assert!(rp.cleanup(), "calibrate format test failed");
}

#[test]
fn calibrate_validation() {
    let mut rp = RegParams::new("calibrate_validation");

    let dir = tempfile::tempdir().expect("tempdir");
    let src = write_source(dir.path(), "waves.png", ImageFormat::Png);
    let options = CalibrationOptions::new().with_temp_dir(dir.path());

    for target in [-0.01, 1.01] {
        let err = find_threshold_for_ratio_with(&src, ErrorMetric::Variance, target, &options)
            .unwrap_err();
        rp.check(err.is_invalid_argument(), "target outside [0, 1]");
    }

    let missing = dir.path().join("missing.png");
    let err = find_threshold_for_ratio_with(&missing, ErrorMetric::Variance, 0.5, &options)
        .unwrap_err();
    rp.check(
        matches!(err, TreeError::SizeUnavailable { .. }),
        "missing source",
    );

    let garbage = dir.path().join("garbage.png");
    std::fs::write(&garbage, b"not an image at all").expect("write garbage");
    let err = find_threshold_for_ratio_with(&garbage, ErrorMetric::Variance, 0.5, &options)
        .unwrap_err();
    rp.check(matches!(err, TreeError::Image(_)), "undecodable source");

    assert!(rp.cleanup(), "calibrate validation test failed");
}
