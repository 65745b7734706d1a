//! Quadtree construction, reconstruction and saving

use std::path::Path;

use crate::error::{TreeError, TreeResult};
use crate::metric::ErrorMetric;
use crate::node::QuadNode;
use crate::report::{CompressionReport, compression_report};
use quadpress_core::{Raster, RasterMut, Rect};
use quadpress_io::ImageFormat;
use tracing::debug;

/// Parameters controlling a decomposition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecomposeOptions {
    /// Homogeneity metric
    pub metric: ErrorMetric,
    /// Acceptance threshold, compared with the metric score
    pub threshold: f64,
    /// Smallest side length a region may be split down to
    pub min_block_size: u32,
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            metric: ErrorMetric::Variance,
            threshold: 0.0,
            min_block_size: 1,
        }
    }
}

impl DecomposeOptions {
    /// Create options for `metric` with a zero threshold and 1-pixel blocks
    pub fn new(metric: ErrorMetric) -> Self {
        Self {
            metric,
            ..Default::default()
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_block_size(mut self, size: u32) -> Self {
        self.min_block_size = size;
        self
    }

    /// Reject a non-finite or negative threshold and a zero block size
    pub fn validate(&self) -> TreeResult<()> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(TreeError::InvalidParameters(format!(
                "threshold must be a finite value >= 0, got {}",
                self.threshold
            )));
        }
        if self.min_block_size == 0 {
            return Err(TreeError::InvalidParameters(
                "min_block_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Shape summary of a built tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    /// Number of leaves (flat-colored blocks)
    pub leaves: usize,
    /// Number of nodes, root included
    pub nodes: usize,
    /// Longest root-to-leaf path; a single-leaf tree has depth 0
    pub depth: u32,
}

/// A quadtree decomposition of one raster.
///
/// The tree owns only its nodes; the source raster is borrowed while the
/// tree is built and not retained.
///
/// # Example
///
/// ```
/// use quadpress_core::{Raster, RasterMut};
/// use quadpress_tree::{DecomposeOptions, ErrorMetric, QuadTree};
///
/// let raster: Raster = RasterMut::new(16, 16).unwrap().into();
/// let tree = QuadTree::new(&raster, DecomposeOptions::new(ErrorMetric::Variance)).unwrap();
/// assert_eq!(tree.stats().leaves, 1);
/// ```
#[derive(Debug, Clone)]
pub struct QuadTree {
    root: QuadNode,
    options: DecomposeOptions,
    width: u32,
    height: u32,
}

impl QuadTree {
    /// Decompose `raster` with validated `options`
    pub fn new(raster: &Raster, options: DecomposeOptions) -> TreeResult<Self> {
        options.validate()?;
        let (width, height) = raster.dimensions();
        let root = QuadNode::decompose(
            raster,
            Rect::full(width, height),
            options.metric,
            options.threshold,
            options.min_block_size,
        );
        let tree = QuadTree {
            root,
            options,
            width,
            height,
        };
        let stats = tree.stats();
        debug!(
            metric = %options.metric,
            threshold = options.threshold,
            min_block_size = options.min_block_size,
            leaves = stats.leaves,
            depth = stats.depth,
            "decomposed {}x{} raster",
            width,
            height
        );
        Ok(tree)
    }

    /// Decompose `raster` using a numeric method id (1..=5)
    pub fn build(
        raster: &Raster,
        method_id: u8,
        threshold: f64,
        min_block_size: u32,
    ) -> TreeResult<Self> {
        let metric = ErrorMetric::from_method_id(method_id)?;
        let options = DecomposeOptions::new(metric)
            .with_threshold(threshold)
            .with_min_block_size(min_block_size);
        Self::new(raster, options)
    }

    pub fn root(&self) -> &QuadNode {
        &self.root
    }

    pub fn options(&self) -> &DecomposeOptions {
        &self.options
    }

    pub fn metric(&self) -> ErrorMetric {
        self.options.metric
    }

    pub fn threshold(&self) -> f64 {
        self.options.threshold
    }

    pub fn min_block_size(&self) -> u32 {
        self.options.min_block_size
    }

    /// Dimensions of the source raster
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            leaves: self.root.leaf_count(),
            nodes: self.root.node_count(),
            depth: self.root.depth(),
        }
    }

    /// Paint the leaves into `target`.
    ///
    /// `target` normally has the source dimensions; leaves that fall
    /// outside a smaller target are cut off.
    pub fn reconstruct(&self, target: &mut RasterMut) {
        self.root.fill(target);
    }

    /// Render the simplified image at the source dimensions
    pub fn render(&self) -> TreeResult<Raster> {
        let mut out = RasterMut::new(self.width, self.height)?;
        self.reconstruct(&mut out);
        Ok(out.into())
    }

    /// Render and write the simplified image, format chosen by extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> TreeResult<()> {
        let format = ImageFormat::from_path(path.as_ref())?;
        self.save_as(path, format)
    }

    /// Render and write the simplified image in an explicit format
    pub fn save_as<P: AsRef<Path>>(&self, path: P, format: ImageFormat) -> TreeResult<()> {
        let rendered = self.render()?;
        quadpress_io::write_image(&rendered, path.as_ref(), format)?;
        debug!(path = %path.as_ref().display(), ?format, "saved reconstruction");
        Ok(())
    }

    /// Compare the on-disk sizes of a source file and its compressed output
    pub fn compression_ratio<P, Q>(&self, original: P, compressed: Q) -> TreeResult<CompressionReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        compression_report(original, compressed)
    }
}
