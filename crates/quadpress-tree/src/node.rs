//! Quadtree nodes
//!
//! A node covers one rectangle of the source raster and is either a leaf
//! carrying the mean color of that rectangle or an internal node with
//! exactly four children in the order top-left, top-right, bottom-left,
//! bottom-right. The children tile the parent; odd remainders go to the
//! right and bottom children.

use crate::metric::{ErrorMetric, region_mean};
use quadpress_core::{Raster, RasterMut, Rect, color};

#[derive(Debug, Clone, PartialEq)]
enum NodeKind {
    Leaf { avg_color: [f64; 3] },
    Split(Box<[QuadNode; 4]>),
}

/// One region of a quadtree decomposition
#[derive(Debug, Clone, PartialEq)]
pub struct QuadNode {
    rect: Rect,
    kind: NodeKind,
}

impl QuadNode {
    /// Recursively decompose `rect` of `raster`.
    ///
    /// A region becomes a leaf without being scored when either side is
    /// at most `min_block_size` or would drop below it after halving.
    /// Otherwise it becomes a leaf when `metric` accepts its score against
    /// `threshold`, and is split into quadrants when it does not.
    pub fn decompose(
        raster: &Raster,
        rect: Rect,
        metric: ErrorMetric,
        threshold: f64,
        min_block_size: u32,
    ) -> Self {
        let too_small = rect.w <= min_block_size
            || rect.h <= min_block_size
            || rect.w / 2 < min_block_size
            || rect.h / 2 < min_block_size;

        if too_small || metric.accepts(metric.score(raster, &rect), threshold) {
            return Self::leaf(rect, region_mean(raster, &rect));
        }

        let children = rect
            .split_quadrants()
            .map(|quadrant| Self::decompose(raster, quadrant, metric, threshold, min_block_size));
        QuadNode {
            rect,
            kind: NodeKind::Split(Box::new(children)),
        }
    }

    /// Create a leaf with a known mean color
    pub fn leaf(rect: Rect, avg_color: [f64; 3]) -> Self {
        QuadNode {
            rect,
            kind: NodeKind::Leaf { avg_color },
        }
    }

    /// Region covered by this node
    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Per-channel mean of the region, `None` for internal nodes
    pub fn avg_color(&self) -> Option<[f64; 3]> {
        match self.kind {
            NodeKind::Leaf { avg_color } => Some(avg_color),
            NodeKind::Split(_) => None,
        }
    }

    /// Children in TL, TR, BL, BR order, `None` for leaves
    pub fn children(&self) -> Option<&[QuadNode; 4]> {
        match &self.kind {
            NodeKind::Leaf { .. } => None,
            NodeKind::Split(children) => Some(children),
        }
    }

    /// Number of leaves in this subtree
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { .. } => 1,
            NodeKind::Split(children) => children.iter().map(QuadNode::leaf_count).sum(),
        }
    }

    /// Number of nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { .. } => 1,
            NodeKind::Split(children) => {
                1 + children.iter().map(QuadNode::node_count).sum::<usize>()
            }
        }
    }

    /// Depth of this subtree; a leaf has depth 0
    pub fn depth(&self) -> u32 {
        match &self.kind {
            NodeKind::Leaf { .. } => 0,
            NodeKind::Split(children) => {
                1 + children.iter().map(QuadNode::depth).max().unwrap_or(0)
            }
        }
    }

    /// Leaves of this subtree in depth-first TL, TR, BL, BR order
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }

    /// Paint every leaf of this subtree into `target` with its rounded
    /// mean color. Pixels outside `target` are skipped.
    pub fn fill(&self, target: &mut RasterMut) {
        for leaf in self.leaves() {
            if let Some(avg) = leaf.avg_color() {
                target.fill_rect(&leaf.rect, avg.map(color::quantize));
            }
        }
    }
}

/// Iterator over the leaves of a subtree
pub struct Leaves<'a> {
    stack: Vec<&'a QuadNode>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a QuadNode;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match &node.kind {
                NodeKind::Leaf { .. } => return Some(node),
                NodeKind::Split(children) => self.stack.extend(children.iter().rev()),
            }
        }
        None
    }
}
