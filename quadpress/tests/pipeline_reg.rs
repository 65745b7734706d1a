//! End-to-end pipeline regression test
//!
//! Runs the load → decompose → save → report pipeline through
//! `RunConfig` and through the `quadpress` binary.
//!
//! Run with:
//! ```
//! cargo test -p quadpress --test pipeline_reg
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use quadpress::{ErrorMetric, ImageFormat, Mode, RunConfig};
use quadpress_test::{RegParams, synth};

fn write_source(dir: &Path) -> PathBuf {
    let path = dir.join("source.bmp");
    quadpress::io::write_image(&synth::waves(64, 48), &path, ImageFormat::Bmp)
        .expect("write source");
    path
}

fn quadpress_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_quadpress"))
}

#[test]
fn pipeline_threshold_mode() {
    let mut rp = RegParams::new("pipeline_threshold");

    let dir = tempfile::tempdir().expect("tempdir");
    let src = write_source(dir.path());
    let config = RunConfig::new(
        src.clone(),
        None,
        ErrorMetric::MaxDifference,
        Mode::Threshold {
            threshold: 30.0,
            min_block_size: 2,
        },
    )
    .expect("config");
    rp.check(config.output == dir.path().join("source_quadtree.png"), "default output");

    let summary = config.run().expect("run");
    eprintln!(
        "  nodes={} leaves={} depth={} saved={:.2}%",
        summary.stats.nodes,
        summary.stats.leaves,
        summary.stats.depth,
        summary.report.percent_saved()
    );
    rp.check(config.output.exists(), "output written");
    rp.check(summary.calibration.is_none(), "no calibration");
    rp.compare_values(30.0, summary.threshold, 0.0);
    rp.check(summary.report.percent_saved() > 0.0, "png smaller than bmp");

    let out = quadpress::io::read_image(&config.output).expect("read output");
    rp.check(out.dimensions() == (64, 48), "output dimensions");
    rp.write_raster(&out, ImageFormat::Png).expect("write");

    assert!(rp.cleanup(), "pipeline threshold test failed");
}

#[test]
fn pipeline_target_compression_mode() {
    let mut rp = RegParams::new("pipeline_target");

    let dir = tempfile::tempdir().expect("tempdir");
    let src = write_source(dir.path());
    let out = dir.path().join("calibrated.png");
    let config = RunConfig::new(
        src,
        Some(out.clone()),
        ErrorMetric::Variance,
        Mode::TargetCompression(0.9),
    )
    .expect("config");

    let summary = config.run().expect("run");
    let cal = summary.calibration.expect("calibration");
    eprintln!(
        "  threshold={:.3} ratio={:.4} iterations={}",
        cal.threshold, cal.achieved_ratio, cal.iterations
    );
    rp.compare_values(cal.threshold, summary.threshold, 0.0);
    rp.compare_values(cal.achieved_ratio, summary.report.size_ratio(), 1e-12);

    // Only the source and the output remain
    let mut names: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    rp.check(names == ["calibrated.png", "source.bmp"], "no calibration scratch files left");

    assert!(rp.cleanup(), "pipeline target test failed");
}

#[test]
fn pipeline_binary() {
    let mut rp = RegParams::new("pipeline_binary");

    let dir = tempfile::tempdir().expect("tempdir");
    let src = write_source(dir.path());
    let out = dir.path().join("out.jpg");

    let output = quadpress_bin()
        .arg(&src)
        .args(["-m", "entropy", "-t", "2.5", "-b", "2", "-o"])
        .arg(&out)
        .output()
        .expect("spawn");
    let stdout = String::from_utf8_lossy(&output.stdout);
    eprintln!("{stdout}");
    rp.check(output.status.success(), "threshold run succeeds");
    rp.check(stdout.contains("Total nodes:"), "reports node count");
    rp.check(stdout.contains("Tree depth:"), "reports depth");
    rp.check(out.exists(), "jpeg written");

    let output = quadpress_bin()
        .arg(&src)
        .args(["--method", "5", "--target-compression", "0.5"])
        .output()
        .expect("spawn");
    rp.check(output.status.success(), "calibrated run succeeds");
    rp.check(dir.path().join("source_quadtree.png").exists(), "default output");

    // Failures exit nonzero
    let failures: [&[&str]; 6] = [
        &["-t", "-1"],
        &["-m", "7", "-t", "1"],
        &["-m", "ssim", "-t", "1.5"],
        &["--target-compression", "0"],
        &["-t", "5", "--target-compression", "0.5"],
        &["-b", "4", "--target-compression", "0.5"],
    ];
    for args in failures {
        let status = quadpress_bin().arg(&src).args(args).status().expect("spawn");
        rp.check(!status.success(), &args.join(" "));
    }
    let status = quadpress_bin()
        .arg(dir.path().join("missing.png"))
        .args(["-t", "10"])
        .status()
        .expect("spawn");
    rp.check(!status.success(), "missing input");
    let status = quadpress_bin()
        .arg(&src)
        .args(["-t", "10", "-o"])
        .arg(dir.path().join("out.gif"))
        .status()
        .expect("spawn");
    rp.check(!status.success(), "unsupported output");

    assert!(rp.cleanup(), "pipeline binary test failed");
}
