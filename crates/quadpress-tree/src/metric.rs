//! Homogeneity metrics
//!
//! Every metric scores one rectangular region of a raster. Regions are
//! clipped to the raster before scoring; pixels outside the raster are
//! never read, and a region with no in-bounds pixel scores 0.0.
//!
//! | Method id | Metric             | Range        | Homogeneous when     |
//! |-----------|--------------------|--------------|----------------------|
//! | 1         | Variance           | `[0, 16256.25]` | score <= threshold |
//! | 2         | Mean abs deviation | `[0, 127.5]` | score <= threshold   |
//! | 3         | Max difference     | `[0, 255]`   | score <= threshold   |
//! | 4         | Entropy (bits)     | `[0, 8]`     | score <= threshold   |
//! | 5         | SSIM               | `[0, 1]`     | score >= threshold   |

use std::fmt;
use std::str::FromStr;

use crate::error::{TreeError, TreeResult};
use quadpress_core::{CHANNELS, Raster, Rect, color};

/// SSIM luminance stabilizer, `(0.01 * 255)^2`
pub const SSIM_C1: f64 = 6.5025;
/// SSIM contrast stabilizer, `(0.03 * 255)^2`
pub const SSIM_C2: f64 = 58.5225;
/// SSIM structure stabilizer
pub const SSIM_C3: f64 = SSIM_C2 / 2.0;

/// Which way a score moves as a region gets more uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Error measures: 0.0 means perfectly uniform
    LowerIsHomogeneous,
    /// Similarity measures: 1.0 means perfectly uniform
    HigherIsHomogeneous,
}

/// Homogeneity metric used to decide whether a region is split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ErrorMetric {
    /// Per-channel variance averaged over the three channels
    #[default]
    Variance,
    /// Per-channel mean absolute deviation averaged over the channels
    MeanAbsoluteDeviation,
    /// Per-channel `max - min` averaged over the channels
    MaxDifference,
    /// Per-channel Shannon entropy (bits) averaged over the channels
    Entropy,
    /// Structural similarity between the region and its flattened mean
    Ssim,
}

impl ErrorMetric {
    /// All metrics in method-id order
    pub const ALL: [ErrorMetric; 5] = [
        ErrorMetric::Variance,
        ErrorMetric::MeanAbsoluteDeviation,
        ErrorMetric::MaxDifference,
        ErrorMetric::Entropy,
        ErrorMetric::Ssim,
    ];

    /// Look up a metric by its numeric method id (1..=5)
    pub fn from_method_id(id: u8) -> TreeResult<Self> {
        match id {
            1..=5 => Ok(Self::ALL[id as usize - 1]),
            _ => Err(TreeError::InvalidParameters(format!(
                "method id must be in 1..=5, got {id}"
            ))),
        }
    }

    /// Numeric method id (1..=5)
    pub fn method_id(self) -> u8 {
        match self {
            ErrorMetric::Variance => 1,
            ErrorMetric::MeanAbsoluteDeviation => 2,
            ErrorMetric::MaxDifference => 3,
            ErrorMetric::Entropy => 4,
            ErrorMetric::Ssim => 5,
        }
    }

    /// Short name, as accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            ErrorMetric::Variance => "variance",
            ErrorMetric::MeanAbsoluteDeviation => "mad",
            ErrorMetric::MaxDifference => "max-diff",
            ErrorMetric::Entropy => "entropy",
            ErrorMetric::Ssim => "ssim",
        }
    }

    pub fn polarity(self) -> Polarity {
        match self {
            ErrorMetric::Ssim => Polarity::HigherIsHomogeneous,
            _ => Polarity::LowerIsHomogeneous,
        }
    }

    /// Largest meaningful threshold for this metric.
    ///
    /// Used as the upper end of the calibration search interval and as
    /// the ceiling for user-supplied thresholds.
    pub fn upper_bound(self) -> f64 {
        match self {
            ErrorMetric::Variance => 16256.25,
            ErrorMetric::MeanAbsoluteDeviation => 127.5,
            ErrorMetric::MaxDifference => 255.0,
            ErrorMetric::Entropy => 8.0,
            ErrorMetric::Ssim => 1.0,
        }
    }

    /// Decide whether `score` means the region is uniform enough to stop
    pub fn accepts(self, score: f64, threshold: f64) -> bool {
        match self.polarity() {
            Polarity::LowerIsHomogeneous => score <= threshold,
            Polarity::HigherIsHomogeneous => score >= threshold,
        }
    }

    /// Score a region of `raster` with this metric
    pub fn score(self, raster: &Raster, rect: &Rect) -> f64 {
        match self {
            ErrorMetric::Variance => variance(raster, rect),
            ErrorMetric::MeanAbsoluteDeviation => mean_absolute_deviation(raster, rect),
            ErrorMetric::MaxDifference => max_difference(raster, rect),
            ErrorMetric::Entropy => entropy(raster, rect),
            ErrorMetric::Ssim => {
                let mean = region_mean(raster, rect);
                let flat = mean.map(color::quantize);
                ssim_against_color(raster, rect, flat)
            }
        }
    }
}

impl fmt::Display for ErrorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorMetric {
    type Err = TreeError;

    /// Accepts a metric name or its method id
    fn from_str(s: &str) -> TreeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "variance" | "var" => Ok(ErrorMetric::Variance),
            "mad" | "mean-absolute-deviation" => Ok(ErrorMetric::MeanAbsoluteDeviation),
            "max-diff" | "maxdiff" | "max-difference" => Ok(ErrorMetric::MaxDifference),
            "entropy" => Ok(ErrorMetric::Entropy),
            "ssim" => Ok(ErrorMetric::Ssim),
            other => match other.parse::<u8>() {
                Ok(id) => ErrorMetric::from_method_id(id),
                Err(_) => Err(TreeError::InvalidParameters(format!(
                    "unknown method '{s}'"
                ))),
            },
        }
    }
}

/// Iterate the in-bounds pixels of a region in row-major order
pub fn region_pixels<'a>(raster: &'a Raster, rect: &Rect) -> impl Iterator<Item = [u8; 3]> + 'a {
    let clipped = rect.clip(raster.width(), raster.height());
    clipped.into_iter().flat_map(move |r| {
        (r.y..r.bottom()).flat_map(move |y| {
            let row = raster.row(y);
            row[r.x as usize * CHANNELS..r.right() as usize * CHANNELS]
                .chunks_exact(CHANNELS)
                .map(|px| [px[0], px[1], px[2]])
        })
    })
}

/// Per-channel mean of a region, `[0.0; 3]` when the region is empty
pub fn region_mean(raster: &Raster, rect: &Rect) -> [f64; 3] {
    let mut sums = [0u64; 3];
    let mut count = 0u64;
    for px in region_pixels(raster, rect) {
        for c in 0..CHANNELS {
            sums[c] += px[c] as u64;
        }
        count += 1;
    }
    if count == 0 {
        return [0.0; 3];
    }
    sums.map(|s| s as f64 / count as f64)
}

/// Average over the channels of the per-channel deviation `dev(sample - mean)`
fn mean_deviation(raster: &Raster, rect: &Rect, dev: impl Fn(f64) -> f64) -> f64 {
    let mean = region_mean(raster, rect);
    let mut sums = [0.0f64; 3];
    let mut count = 0u64;
    for px in region_pixels(raster, rect) {
        for c in 0..CHANNELS {
            sums[c] += dev(px[c] as f64 - mean[c]);
        }
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    sums.iter().map(|s| s / count as f64).sum::<f64>() / CHANNELS as f64
}

/// Population variance per channel, averaged over R, G and B
pub fn variance(raster: &Raster, rect: &Rect) -> f64 {
    mean_deviation(raster, rect, |d| d * d)
}

/// Mean absolute deviation per channel, averaged over R, G and B
pub fn mean_absolute_deviation(raster: &Raster, rect: &Rect) -> f64 {
    mean_deviation(raster, rect, f64::abs)
}

/// Per-channel range `max - min`, averaged over R, G and B
pub fn max_difference(raster: &Raster, rect: &Rect) -> f64 {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    let mut any = false;
    for px in region_pixels(raster, rect) {
        for c in 0..CHANNELS {
            lo[c] = lo[c].min(px[c]);
            hi[c] = hi[c].max(px[c]);
        }
        any = true;
    }
    if !any {
        return 0.0;
    }
    (0..CHANNELS)
        .map(|c| (hi[c] - lo[c]) as f64)
        .sum::<f64>()
        / CHANNELS as f64
}

/// Shannon entropy in bits of each channel histogram, averaged over R, G and B
pub fn entropy(raster: &Raster, rect: &Rect) -> f64 {
    let mut hist = [[0u64; 256]; 3];
    let mut count = 0u64;
    for px in region_pixels(raster, rect) {
        for c in 0..CHANNELS {
            hist[c][px[c] as usize] += 1;
        }
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    let total = count as f64;
    let bits: f64 = hist
        .iter()
        .map(|h| {
            h.iter()
                .filter(|&&n| n > 0)
                .map(|&n| {
                    let p = n as f64 / total;
                    -p * p.log2()
                })
                .sum::<f64>()
        })
        .sum();
    bits / CHANNELS as f64
}

/// Structural similarity of two equally sized regions.
///
/// `a_rect` selects the region in `a`; the region in `b` has the same
/// size and starts at `b_origin`. Only offsets that are in bounds in both
/// rasters take part. Pixels are compared by luminance.
pub fn ssim(a: &Raster, a_rect: &Rect, b: &Raster, b_origin: (u32, u32)) -> f64 {
    let pairs = || {
        (0..a_rect.h).flat_map(move |dy| {
            (0..a_rect.w).filter_map(move |dx| {
                let pa = a.get_rgb(a_rect.x.checked_add(dx)?, a_rect.y.checked_add(dy)?)?;
                let pb = b.get_rgb(b_origin.0.checked_add(dx)?, b_origin.1.checked_add(dy)?)?;
                Some((color::luminance(pa), color::luminance(pb)))
            })
        })
    };
    ssim_from_pairs(pairs)
}

/// SSIM between a region and the same region filled with one color
pub fn ssim_against_color(raster: &Raster, rect: &Rect, rgb: [u8; 3]) -> f64 {
    let flat = color::luminance(rgb);
    ssim_from_pairs(|| region_pixels(raster, rect).map(move |px| (color::luminance(px), flat)))
}

/// Luminance x contrast x structure over `(x, y)` luminance pairs.
///
/// Moments are computed in two passes so that identical inputs give
/// exactly zero variance.
fn ssim_from_pairs<F, I>(pairs: F) -> f64
where
    F: Fn() -> I,
    I: Iterator<Item = (f64, f64)>,
{
    let mut count = 0u64;
    let (mut sum_x, mut sum_y) = (0.0f64, 0.0f64);
    for (x, y) in pairs() {
        sum_x += x;
        sum_y += y;
        count += 1;
    }
    if count == 0 {
        return 0.0;
    }
    let n = count as f64;
    let (mu_x, mu_y) = (sum_x / n, sum_y / n);

    let (mut var_x, mut var_y, mut cov) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in pairs() {
        let (dx, dy) = (x - mu_x, y - mu_y);
        var_x += dx * dx;
        var_y += dy * dy;
        cov += dx * dy;
    }
    let (var_x, var_y, cov) = (var_x / n, var_y / n, cov / n);
    let (sigma_x, sigma_y) = (var_x.sqrt(), var_y.sqrt());

    let luminance = (2.0 * mu_x * mu_y + SSIM_C1) / (mu_x * mu_x + mu_y * mu_y + SSIM_C1);
    let contrast = (2.0 * sigma_x * sigma_y + SSIM_C2) / (var_x + var_y + SSIM_C2);
    let structure = (cov + SSIM_C3) / (sigma_x * sigma_y + SSIM_C3);
    luminance * contrast * structure
}
