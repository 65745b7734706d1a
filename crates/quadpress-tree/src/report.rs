//! File-size comparison between a source image and its reconstruction

use std::fs;
use std::path::Path;

use crate::error::{TreeError, TreeResult};
use tracing::{info, warn};

/// Sizes of a source file and the file produced from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionReport {
    /// Bytes on disk of the source image
    pub original_bytes: u64,
    /// Bytes on disk of the reconstructed image
    pub produced_bytes: u64,
}

impl CompressionReport {
    /// Percentage of the original size saved, `(1 - produced / original) * 100`.
    ///
    /// Negative when the produced file is larger than the source.
    pub fn percent_saved(&self) -> f64 {
        (1.0 - self.size_ratio()) * 100.0
    }

    /// `produced / original`, the quantity calibration searches on
    pub fn size_ratio(&self) -> f64 {
        self.produced_bytes as f64 / self.original_bytes as f64
    }
}

fn file_size(path: &Path) -> TreeResult<u64> {
    let unavailable = |message: String| {
        warn!(path = %path.display(), %message, "file size unavailable");
        TreeError::SizeUnavailable {
            path: path.to_path_buf(),
            message,
        }
    };
    let len = fs::metadata(path)
        .map_err(|e| unavailable(e.to_string()))?
        .len();
    if len == 0 {
        return Err(unavailable("file is empty".to_string()));
    }
    Ok(len)
}

/// Measure `original` and `produced` on disk.
///
/// # Errors
///
/// Returns [`TreeError::SizeUnavailable`] when either file is missing,
/// unreadable or empty.
pub fn compression_report<P, Q>(original: P, produced: Q) -> TreeResult<CompressionReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let report = CompressionReport {
        original_bytes: file_size(original.as_ref())?,
        produced_bytes: file_size(produced.as_ref())?,
    };
    info!(
        original_bytes = report.original_bytes,
        produced_bytes = report.produced_bytes,
        percent_saved = report.percent_saved(),
        "compression measured"
    );
    Ok(report)
}
