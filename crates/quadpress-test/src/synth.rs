//! Synthetic test rasters
//!
//! Deterministic images with known structure, so that decomposition
//! results can be predicted exactly.

use quadpress_core::{Raster, RasterMut, Rect};

/// Pure colors used throughout the suites
pub const RED: [u8; 3] = [255, 0, 0];
pub const GREEN: [u8; 3] = [0, 255, 0];
pub const BLUE: [u8; 3] = [0, 0, 255];
pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BLACK: [u8; 3] = [0, 0, 0];

/// A raster filled with one color.
pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> Raster {
    let mut raster = RasterMut::new(width, height).unwrap();
    raster.fill_rect(&Rect::full(width, height), rgb);
    raster.into()
}

/// A raster split into four solid quadrants.
///
/// `colors` are in quadrant order: top-left, top-right, bottom-left,
/// bottom-right. Quadrant boundaries follow [`Rect::split_quadrants`].
pub fn quadrants(width: u32, height: u32, colors: [[u8; 3]; 4]) -> Raster {
    let mut raster = RasterMut::new(width, height).unwrap();
    for (rect, rgb) in Rect::full(width, height).split_quadrants().iter().zip(colors) {
        raster.fill_rect(rect, rgb);
    }
    raster.into()
}

/// A checkerboard of `cell` x `cell` squares alternating between `a` and `b`.
pub fn checkerboard(width: u32, height: u32, cell: u32, a: [u8; 3], b: [u8; 3]) -> Raster {
    let mut raster = RasterMut::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let rgb = if (x / cell + y / cell) % 2 == 0 { a } else { b };
            raster.set_rgb(x, y, rgb);
        }
    }
    raster.into()
}

/// A smooth multi-frequency pattern, different in each channel.
pub fn waves(width: u32, height: u32) -> Raster {
    let mut raster = RasterMut::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            // Spatial variation at several scales for meaningful quadtree stats
            let fx = x as f64 / width as f64;
            let fy = y as f64 / height as f64;
            let tau = std::f64::consts::TAU;
            let r = 128.0 + 60.0 * (fx * tau).sin() + 40.0 * (fy * 2.0 * tau).cos();
            let g = 128.0 + 90.0 * ((fx + fy) * 9.42).sin();
            let b = 128.0 + 50.0 * (fx * 3.0 * tau).cos() + 50.0 * (fy * tau).sin();
            raster.set_sample(x, y, 0, r as i32);
            raster.set_sample(x, y, 1, g as i32);
            raster.set_sample(x, y, 2, b as i32);
        }
    }
    raster.into()
}
