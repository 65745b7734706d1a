//! Sample access functions
//!
//! Two flavors of reads are provided. `get_*` returns `None` outside the
//! raster. `sample` is the assertion-grade read used by code whose
//! coordinates are in bounds by construction; it panics otherwise.
//!
//! Writes clamp the value into `[0, 255]` instead of rejecting it, and
//! panic on out-of-range coordinates.

use super::{CHANNELS, Raster, RasterData, RasterMut};
use crate::Rect;

impl RasterData {
    #[inline]
    fn get_sample(&self, x: u32, y: u32, channel: usize) -> Option<u8> {
        if self.in_bounds(x, y, channel) {
            Some(self.data[self.offset(x, y, channel)])
        } else {
            None
        }
    }

    #[inline]
    fn get_rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if !self.in_bounds(x, y, 0) {
            return None;
        }
        let i = self.offset(x, y, 0);
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }
}

impl Raster {
    /// Get one sample at (x, y).
    ///
    /// Returns `None` if the coordinates or the channel are out of range.
    #[inline]
    pub fn get_sample(&self, x: u32, y: u32, channel: usize) -> Option<u8> {
        self.inner.get_sample(x, y, channel)
    }

    /// Get one sample at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if `x >= width`, `y >= height` or `channel >= 3`.
    #[inline]
    pub fn sample(&self, x: u32, y: u32, channel: usize) -> u8 {
        self.inner.data[self.inner.offset(x, y, channel)]
    }

    /// Get the RGB triple at (x, y).
    #[inline]
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.inner.get_rgb(x, y)
    }
}

impl RasterMut {
    /// Get one sample at (x, y).
    #[inline]
    pub fn get_sample(&self, x: u32, y: u32, channel: usize) -> Option<u8> {
        self.inner.get_sample(x, y, channel)
    }

    /// Get the RGB triple at (x, y).
    #[inline]
    pub fn get_rgb(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.inner.get_rgb(x, y)
    }

    /// Set one sample at (x, y), clamping `value` to `[0, 255]`.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width`, `y >= height` or `channel >= 3`.
    #[inline]
    pub fn set_sample(&mut self, x: u32, y: u32, channel: usize, value: i32) {
        let i = self.inner.offset(x, y, channel);
        self.inner.data[i] = value.clamp(0, 255) as u8;
    }

    /// Set the RGB triple at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    #[inline]
    pub fn set_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.inner.offset(x, y, 0);
        self.inner.data[i..i + CHANNELS].copy_from_slice(&rgb);
    }

    /// Paint every in-bounds pixel of `rect` with one color.
    ///
    /// Parts of the rectangle that fall outside the raster are skipped.
    /// Returns the number of pixels written.
    pub fn fill_rect(&mut self, rect: &Rect, rgb: [u8; 3]) -> u64 {
        let Some(clipped) = rect.clip(self.inner.width, self.inner.height) else {
            return 0;
        };
        let stride = self.inner.width as usize * CHANNELS;
        for y in clipped.y..clipped.bottom() {
            let start = y as usize * stride + clipped.x as usize * CHANNELS;
            let end = start + clipped.w as usize * CHANNELS;
            for px in self.inner.data[start..end].chunks_exact_mut(CHANNELS) {
                px.copy_from_slice(&rgb);
            }
        }
        clipped.area()
    }
}
