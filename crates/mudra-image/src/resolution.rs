//! Types for representing frame and mask resolutions.

use std::fmt;

/// Resolution (`width x height`) of a depth frame or mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    /// Resolution of the Kinect v2 depth stream: `512x424`
    pub const KINECT_DEPTH: Self = Self {
        width: 512,
        height: 424,
    };

    /// Normalized resolution hand regions are resized to: `120x120`
    pub const HAND: Self = Self {
        width: 120,
        height: 120,
    };

    /// Creates a new [`Resolution`] of `width x height`.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the width of this [`Resolution`].
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of this [`Resolution`].
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns whether the (signed) pixel coordinate `(x, y)` lies inside `self`.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Computes the row-major buffer index of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside of `self`.
    #[inline]
    #[track_caller]
    pub fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x},{y}) out of bounds for resolution {self}"
        );
        y as usize * self.width as usize + x as usize
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let res = Resolution::new(4, 3);
        assert!(res.contains(0, 0));
        assert!(res.contains(3, 2));
        assert!(!res.contains(4, 2));
        assert!(!res.contains(3, 3));
        assert!(!res.contains(-1, 0));
        assert!(!Resolution::new(0, 0).contains(0, 0));
    }

    #[test]
    fn test_index() {
        let res = Resolution::new(4, 3);
        assert_eq!(res.index(0, 0), 0);
        assert_eq!(res.index(3, 0), 3);
        assert_eq!(res.index(0, 1), 4);
        assert_eq!(res.index(3, 2), 11);
        assert_eq!(res.num_pixels(), 12);
        assert_eq!(Resolution::KINECT_DEPTH.to_string(), "512x424");
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_bounds() {
        Resolution::new(4, 3).index(4, 0);
    }
}
