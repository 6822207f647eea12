//! Integer rectangles in pixel space.

use std::{cmp, fmt};

use embedded_graphics::prelude::*;
use itertools::Itertools;

/// An axis-aligned rectangle of whole pixels.
///
/// The rectangle covers the pixels from `(x, y)` up to, but not including, `(x + width, y +
/// height)`. Rectangles are allowed to have zero width and/or height.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub(crate) rect: embedded_graphics::primitives::Rectangle,
}

impl Rect {
    /// Creates a rectangle extending downwards and right from a point.
    #[inline]
    pub fn from_top_left(top_left_x: i32, top_left_y: i32, width: u32, height: u32) -> Self {
        Self {
            rect: embedded_graphics::primitives::Rectangle {
                top_left: Point {
                    x: top_left_x,
                    y: top_left_y,
                },
                size: Size { width, height },
            },
        }
    }

    /// Creates a rectangle that covers the two (inclusive) corner pixels and everything between.
    pub fn from_corners(top_left: (i32, i32), bottom_right: (i32, i32)) -> Self {
        let (x_min, y_min) = top_left;
        let (x_max, y_max) = bottom_right;
        assert!(x_min <= x_max, "x_min={}, x_max={}", x_min, x_max);
        assert!(y_min <= y_max, "y_min={}, y_max={}", y_min, y_max);
        Self::from_top_left(
            x_min,
            y_min,
            (x_max - x_min + 1) as u32,
            (y_max - y_min + 1) as u32,
        )
    }

    /// Computes the bounding rectangle covering every pixel in `points`.
    ///
    /// Returns `None` if `points` is an empty iterator.
    pub fn bounding<I: IntoIterator<Item = (i32, i32)>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();

        let (x, y) = iter.next()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (x, x, y, y);

        for (x, y) in iter {
            x_min = cmp::min(x_min, x);
            x_max = cmp::max(x_max, x);
            y_min = cmp::min(y_min, y);
            y_max = cmp::max(y_max, y);
        }

        Some(Self::from_corners((x_min, y_min), (x_max, y_max)))
    }

    /// Returns the X coordinate of the left side of the rectangle.
    #[inline]
    pub fn x(&self) -> i32 {
        self.rect.top_left.x
    }

    /// Returns the Y coordinate of the top side of the rectangle.
    #[inline]
    pub fn y(&self) -> i32 {
        self.rect.top_left.y
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.rect.size.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.rect.size.height
    }

    /// Returns the X coordinate of the rightmost column of pixels inside the rectangle.
    ///
    /// For rectangles of zero width, this is `x() - 1`.
    #[inline]
    pub fn x_max(&self) -> i32 {
        self.x() + self.width() as i32 - 1
    }

    /// Returns the Y coordinate of the bottom row of pixels inside the rectangle.
    #[inline]
    pub fn y_max(&self) -> i32 {
        self.y() + self.height() as i32 - 1
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Returns whether the pixel at `(x, y)` lies inside of `self`.
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x() && y >= self.y() && x <= self.x_max() && y <= self.y_max()
    }

    /// Returns whether `self` contains `other`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.x() <= other.x()
            && self.y() <= other.y()
            && i64::from(self.x()) + i64::from(self.width())
                >= i64::from(other.x()) + i64::from(other.width())
            && i64::from(self.y()) + i64::from(self.height())
                >= i64::from(other.y()) + i64::from(other.height())
    }

    /// Returns an iterator over all X,Y coordinates contained in this `Rect`, row by row.
    pub fn iter_coords(&self) -> impl Iterator<Item = (i32, i32)> {
        let (x, y) = (self.x(), self.y());
        let (w, h) = (self.width() as i32, self.height() as i32);

        (y..y + h).cartesian_product(x..x + w).map(|(y, x)| (x, y))
    }
}

impl fmt::Debug for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = (self.x(), self.y());
        let (w, h) = (self.width(), self.height());
        let bx = i64::from(x) + i64::from(w);
        let by = i64::from(y) + i64::from(h);
        write!(f, "Rect @ ({x},{y})-({bx},{by})/{w}x{h}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding() {
        assert!(Rect::bounding(Vec::<(i32, i32)>::new()).is_none());
        assert_eq!(
            Rect::bounding([(0, 0), (1, 1), (-1, -1)]).unwrap(),
            Rect::from_corners((-1, -1), (1, 1)),
        );
        assert_eq!(
            Rect::bounding([(3, 4)]).unwrap(),
            Rect::from_top_left(3, 4, 1, 1),
        );
        assert_eq!(
            Rect::bounding([(1, 1), (2, 5)]).unwrap(),
            Rect::from_top_left(1, 1, 2, 5),
        );
    }

    #[test]
    fn test_contains() {
        let rect = Rect::from_top_left(2, 3, 4, 2);
        assert_eq!(rect.x_max(), 5);
        assert_eq!(rect.y_max(), 4);
        assert!(rect.contains_point(2, 3));
        assert!(rect.contains_point(5, 4));
        assert!(!rect.contains_point(6, 4));
        assert!(!rect.contains_point(5, 5));
        assert!(!rect.contains_point(1, 3));

        let outer = Rect::from_top_left(-8, -8, 16, 16);
        assert!(outer.contains_rect(&outer));
        assert!(outer.contains_rect(&Rect::from_top_left(-7, -7, 15, 15)));
        assert!(!outer.contains_rect(&Rect::from_top_left(-7, -8, 16, 16)));
    }

    #[test]
    fn test_iter_coords() {
        let coords = Rect::from_top_left(1, 2, 2, 2).iter_coords().collect::<Vec<_>>();
        assert_eq!(coords, [(1, 2), (2, 2), (1, 3), (2, 3)]);
        assert_eq!(Rect::from_top_left(0, 0, 0, 5).iter_coords().count(), 0);
    }
}
