//! Rect - Rectangular image regions
//!
//! A `Rect` may extend past the right or bottom edge of the raster it
//! describes. Consumers iterate only the in-bounds part, obtained with
//! [`Rect::clip`].

/// A rectangle region
///
/// A simple `Copy` type since it's small and frequently copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: u32,
    /// Top y coordinate
    pub y: u32,
    /// Width
    pub w: u32,
    /// Height
    pub h: u32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle covering a whole `width` x `height` image
    pub const fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            w: width,
            h: height,
        }
    }

    /// Get the right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.w
    }

    /// Get the bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.h
    }

    /// Get the area
    #[inline]
    pub fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    /// Check if the rectangle is empty (zero area)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Check if a point is inside the rectangle
    #[inline]
    pub fn contains_point(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle overlaps with another
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Restrict the rectangle to a `width` x `height` image.
    ///
    /// Returns `None` when no pixel of the rectangle lies inside the image.
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        if self.x < right && self.y < bottom {
            Some(Rect {
                x: self.x,
                y: self.y,
                w: right - self.x,
                h: bottom - self.y,
            })
        } else {
            None
        }
    }

    /// Split into four quadrants.
    ///
    /// Order is top-left, top-right, bottom-left, bottom-right. The half
    /// sizes use integer division and the right and bottom quadrants absorb
    /// the remainder, so the four parts tile `self` exactly even for odd
    /// dimensions.
    pub fn split_quadrants(&self) -> [Rect; 4] {
        let half_w = self.w / 2;
        let half_h = self.h / 2;
        let rest_w = self.w - half_w;
        let rest_h = self.h - half_h;
        [
            Rect::new(self.x, self.y, half_w, half_h),
            Rect::new(self.x + half_w, self.y, rest_w, half_h),
            Rect::new(self.x, self.y + half_h, half_w, rest_h),
            Rect::new(self.x + half_w, self.y + half_h, rest_w, rest_h),
        ]
    }
}
