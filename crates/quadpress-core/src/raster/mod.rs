//! Raster - The RGB sample grid
//!
//! `Raster` is the pixel buffer every other part of quadpress reads from
//! and writes to. It always holds three 8-bit channels per pixel.
//!
//! # Pixel layout
//!
//! - Samples are stored row-major with no row padding
//! - Each pixel occupies three consecutive bytes in R, G, B order
//! - Sample `(x, y, c)` lives at byte `(y * width + x) * 3 + c`
//!
//! # Ownership model
//!
//! `Raster` uses `Arc` for cheap cloning (shared ownership).
//! To modify samples, copy into a `RasterMut` via [`Raster::to_mut`], then
//! convert back with `Into<Raster>`.

mod access;

use crate::error::{Error, Result};
use std::sync::Arc;

/// Number of channels stored per pixel.
pub const CHANNELS: usize = 3;

/// Internal raster data
#[derive(Debug, Clone, PartialEq, Eq)]
struct RasterData {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Packed RGB samples, `width * height * 3` bytes
    data: Vec<u8>,
}

impl RasterData {
    #[inline]
    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    /// Byte offset of a sample.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates or the channel are out of range.
    #[inline]
    fn offset(&self, x: u32, y: u32, channel: usize) -> usize {
        assert!(
            x < self.width && y < self.height && channel < CHANNELS,
            "sample ({x}, {y}, channel {channel}) outside {}x{} raster",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS + channel
    }

    #[inline]
    fn in_bounds(&self, x: u32, y: u32, channel: usize) -> bool {
        x < self.width && y < self.height && channel < CHANNELS
    }
}

/// Raster - Immutable RGB image
///
/// # Examples
///
/// ```
/// use quadpress_core::Raster;
///
/// let raster = Raster::new(640, 480).unwrap();
/// assert_eq!(raster.width(), 640);
/// assert_eq!(raster.height(), 480);
/// assert_eq!(raster.get_rgb(0, 0), Some([0, 0, 0]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    inner: Arc<RasterData>,
}

impl Raster {
    /// Create a new black raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let data = vec![0u8; RasterData::byte_len(width, height)];
        Ok(Raster {
            inner: Arc::new(RasterData {
                width,
                height,
                data,
            }),
        })
    }

    /// Wrap a packed row-major RGB buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0, and
    /// [`Error::DataLength`] if `data` is not exactly `width * height * 3`
    /// bytes long.
    pub fn from_rgb_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let expected = RasterData::byte_len(width, height);
        if data.len() != expected {
            return Err(Error::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Raster {
            inner: Arc::new(RasterData {
                width,
                height,
                data,
            }),
        })
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    /// Get raw access to the packed samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }

    /// Get the packed samples of one row.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        assert!(y < self.inner.height, "row {y} outside raster");
        let stride = self.inner.width as usize * CHANNELS;
        let start = y as usize * stride;
        &self.inner.data[start..start + stride]
    }

    /// Check if two rasters have the same width and height.
    pub fn sizes_equal(&self, other: &Raster) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Create a mutable copy of this raster.
    pub fn to_mut(&self) -> RasterMut {
        RasterMut {
            inner: (*self.inner).clone(),
        }
    }
}

/// Mutable raster
///
/// Allows modification of the samples. Convert back to an immutable
/// [`Raster`] using `Into<Raster>`.
#[derive(Debug)]
pub struct RasterMut {
    inner: RasterData,
}

impl RasterMut {
    /// Create a new black mutable raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let raster = Raster::new(width, height)?;
        Ok(raster.to_mut())
    }

    /// Get the image width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.inner.width, self.inner.height)
    }

    /// Get raw access to the packed samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.inner.data
    }
}

impl From<RasterMut> for Raster {
    fn from(raster: RasterMut) -> Self {
        Raster {
            inner: Arc::new(raster.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_black() {
        let raster = Raster::new(4, 3).unwrap();
        assert_eq!(raster.dimensions(), (4, 3));
        assert_eq!(raster.data().len(), 4 * 3 * 3);
        assert!(raster.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        assert!(matches!(
            Raster::new(0, 10),
            Err(Error::InvalidDimension {
                width: 0,
                height: 10
            })
        ));
        assert!(Raster::new(10, 0).is_err());
    }

    #[test]
    fn test_from_rgb_bytes_length_check() {
        assert!(Raster::from_rgb_bytes(2, 2, vec![0; 12]).is_ok());
        assert!(matches!(
            Raster::from_rgb_bytes(2, 2, vec![0; 11]),
            Err(Error::DataLength {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn test_row_slices() {
        let bytes: Vec<u8> = (0..18).collect();
        let raster = Raster::from_rgb_bytes(3, 2, bytes).unwrap();
        assert_eq!(raster.row(0), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(raster.row(1), &[9, 10, 11, 12, 13, 14, 15, 16, 17]);
    }

    #[test]
    fn test_to_mut_is_independent() {
        let raster = Raster::new(2, 2).unwrap();
        let mut copy = raster.to_mut();
        copy.set_rgb(0, 0, [9, 9, 9]);
        let copy: Raster = copy.into();
        assert_eq!(raster.get_rgb(0, 0), Some([0, 0, 0]));
        assert_eq!(copy.get_rgb(0, 0), Some([9, 9, 9]));
    }
}
