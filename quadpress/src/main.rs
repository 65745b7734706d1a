//! quadpress - simplify an image into flat quadtree blocks
//!
//! ```text
//! quadpress photo.png -m variance -t 120 -b 4 -o out.png
//! quadpress photo.jpg -m ssim --target-compression 0.6
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quadpress::{ErrorMetric, Mode, RunConfig};

#[derive(Parser, Debug)]
#[command(name = "quadpress", version, about = "Lossy quadtree image simplification")]
struct Args {
    /// Source image (PNG, JPEG or BMP)
    input: PathBuf,

    /// Output image; the extension selects png, jpg/jpeg or bmp
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Homogeneity metric: variance, mad, max-diff, entropy, ssim, or 1..5
    #[arg(short, long, default_value = "variance")]
    method: ErrorMetric,

    /// Fixed threshold
    #[arg(
        short,
        long,
        allow_negative_numbers = true,
        required_unless_present = "target_compression",
        conflicts_with = "target_compression"
    )]
    threshold: Option<f64>,

    /// Smallest block side when using a fixed threshold
    #[arg(
        short = 'b',
        long,
        default_value_t = 1,
        conflicts_with = "target_compression"
    )]
    min_block_size: u32,

    /// Fraction of the source file size to save, in (0, 1]
    #[arg(long, allow_negative_numbers = true)]
    target_compression: Option<f64>,

    /// Log progress (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<RunConfig> {
        let mode = match (self.threshold, self.target_compression) {
            (Some(threshold), _) => Mode::Threshold {
                threshold,
                min_block_size: self.min_block_size,
            },
            (None, Some(c)) => Mode::TargetCompression(c),
            (None, None) => anyhow::bail!("either --threshold or --target-compression is required"),
        };
        RunConfig::new(self.input, self.output, self.method, mode).context("invalid arguments")
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = args.into_config()?;
    let summary = config
        .run()
        .with_context(|| format!("failed to simplify {}", config.input.display()))?;

    println!("Method:            {}", config.metric);
    if let Some(cal) = &summary.calibration {
        println!(
            "Calibrated:        threshold {:.4} after {} iterations (size ratio {:.4})",
            cal.threshold, cal.iterations, cal.achieved_ratio
        );
    } else {
        println!("Threshold:         {}", summary.threshold);
    }
    println!("Total nodes:       {}", summary.stats.nodes);
    println!("Leaves:            {}", summary.stats.leaves);
    println!("Tree depth:        {}", summary.stats.depth);
    println!(
        "Compression:       {:.2}% ({} -> {} bytes)",
        summary.report.percent_saved(),
        summary.report.original_bytes,
        summary.report.produced_bytes
    );
    println!("Execution time:    {} ms", summary.elapsed.as_millis());
    println!("Output:            {}", config.output.display());

    Ok(())
}
