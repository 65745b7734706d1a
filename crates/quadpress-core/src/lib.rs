//! quadpress core - Basic data structures for quadtree image simplification
//!
//! This crate provides the fundamental data structures used throughout
//! quadpress:
//!
//! - [`Raster`] / [`RasterMut`] - The RGB sample grid (immutable / mutable)
//! - [`Rect`] - Rectangular regions, including the quadrant split rule
//! - [`color`] - Channel indices and luminance

pub mod error;
pub mod raster;
pub mod rect;

pub use error::{Error, Result};
pub use raster::{CHANNELS, Raster, RasterMut};
pub use rect::Rect;

/// Channel indices and helper functions for RGB samples.
pub mod color {
    /// Red channel
    pub const RED: usize = 0;
    /// Green channel
    pub const GREEN: usize = 1;
    /// Blue channel
    pub const BLUE: usize = 2;

    /// Luma weights (ITU-R BT.601)
    pub const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

    /// Luminance of an RGB triple.
    #[inline]
    pub fn luminance(rgb: [u8; 3]) -> f64 {
        LUMA_WEIGHTS[RED] * rgb[RED] as f64
            + LUMA_WEIGHTS[GREEN] * rgb[GREEN] as f64
            + LUMA_WEIGHTS[BLUE] * rgb[BLUE] as f64
    }

    /// Truncate a mean channel value to a sample, clamped to `0..=255`.
    #[inline]
    pub fn quantize(value: f64) -> u8 {
        value.clamp(0.0, 255.0) as u8
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_luminance_extremes() {
            assert_eq!(luminance([0, 0, 0]), 0.0);
            assert!((luminance([255, 255, 255]) - 255.0).abs() < 1e-9);
        }

        #[test]
        fn test_luminance_weights() {
            assert!((luminance([100, 0, 0]) - 29.9).abs() < 1e-9);
            assert!((luminance([0, 100, 0]) - 58.7).abs() < 1e-9);
            assert!((luminance([0, 0, 100]) - 11.4).abs() < 1e-9);
        }

        #[test]
        fn test_quantize() {
            assert_eq!(quantize(127.5), 127);
            assert_eq!(quantize(127.99), 127);
            assert_eq!(quantize(128.0), 128);
            assert_eq!(quantize(-3.0), 0);
            assert_eq!(quantize(300.0), 255);
        }
    }
}
