//! Binary masks.

use std::{fmt, path::Path};

use image::{GrayImage, Luma};

use crate::{Rect, Resolution};

/// A row-major grid of booleans marking the pixels that belong to a region.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    resolution: Resolution,
    data: Box<[bool]>,
}

impl Mask {
    /// Creates an empty mask of the given resolution.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            data: vec![false; resolution.num_pixels()].into_boxed_slice(),
        }
    }

    /// Creates a mask by invoking `f` with the coordinates of every pixel.
    pub fn from_fn(resolution: Resolution, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut mask = Self::new(resolution);
        for y in 0..resolution.height() {
            for x in 0..resolution.width() {
                mask.set(x, y, f(x, y));
            }
        }
        mask
    }

    /// Converts a grayscale image to a mask, treating every pixel brighter than 50% as set.
    pub fn from_luma(image: &GrayImage) -> Self {
        Self::from_fn(
            Resolution::new(image.width(), image.height()),
            |x, y| image.get_pixel(x, y).0[0] > 127,
        )
    }

    /// Loads a mask from an image file.
    ///
    /// Any format supported by the `image` crate's enabled decoders is accepted. Color images are
    /// converted to grayscale before thresholding.
    pub fn load<A: AsRef<Path>>(path: A) -> anyhow::Result<Self> {
        Self::load_impl(path.as_ref())
    }

    fn load_impl(path: &Path) -> anyhow::Result<Self> {
        let image = image::open(path)
            .map_err(|e| anyhow::anyhow!("failed to load mask '{}': {e}", path.display()))?;
        let luma = image.to_luma8();
        log::trace!("loaded {}x{} mask from '{}'", luma.width(), luma.height(), path.display());
        Ok(Self::from_luma(&luma))
    }

    /// Renders the mask as a black and white image.
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width(), self.height(), |x, y| {
            Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }

    /// Renders the mask like [`Mask::to_luma`], surrounded by `margin` unset pixels on every side.
    pub fn to_padded_luma(&self, margin: u32) -> GrayImage {
        GrayImage::from_fn(
            self.width() + 2 * margin,
            self.height() + 2 * margin,
            |x, y| {
                let (x, y) = (x as i32 - margin as i32, y as i32 - margin as i32);
                Luma([if self.contains(x, y) { 255 } else { 0 }])
            },
        )
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.resolution.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.resolution.height()
    }

    /// Returns whether the pixel at `(x, y)` is set.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the mask.
    #[inline]
    #[track_caller]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.data[self.resolution.index(x, y)]
    }

    /// Returns whether the pixel at the signed coordinate `(x, y)` is set.
    ///
    /// Coordinates outside the mask are treated as unset.
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.resolution.contains(x, y) && self.get(x as u32, y as u32)
    }

    #[inline]
    #[track_caller]
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        let index = self.resolution.index(x, y);
        self.data[index] = value;
    }

    /// Unsets every pixel, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.fill(false);
    }

    /// Returns the number of set pixels.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|b| **b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|b| *b)
    }

    /// Returns an iterator over the coordinates of all set pixels, row by row.
    pub fn iter_set(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width() as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    /// Computes the smallest rectangle containing every set pixel.
    ///
    /// Returns `None` if no pixel is set.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::bounding(self.iter_set().map(|(x, y)| (x as i32, y as i32)))
    }

    /// Crops `rect` out of `self` and scales it into a mask of resolution `target`.
    ///
    /// The crop is scaled uniformly (nearest neighbor) so that it fits inside `target` minus a
    /// margin of `border` pixels on every side, and is centered in the result. The returned
    /// [`FitTransform`] maps coordinates of `self` into the coordinate space of the result.
    ///
    /// # Panics
    ///
    /// Panics if `rect` is empty or not fully contained in `self`.
    pub fn crop_fit(&self, rect: Rect, target: Resolution, border: u32) -> (Mask, FitTransform) {
        assert!(
            rect.width() > 0 && rect.height() > 0,
            "cannot crop empty rectangle {rect:?}"
        );
        assert!(
            Rect::from_top_left(0, 0, self.width(), self.height()).contains_rect(&rect),
            "crop rectangle {rect:?} exceeds mask of resolution {}",
            self.resolution
        );

        let (w, h) = (rect.width(), rect.height());
        let inner_w = target.width().saturating_sub(2 * border);
        let inner_h = target.height().saturating_sub(2 * border);
        let ratio = f64::min(inner_w as f64 / w as f64, inner_h as f64 / h as f64);

        let new_w = (ratio * w as f64).floor() as u32;
        let new_h = (ratio * h as f64).floor() as u32;
        let x_offset = (target.width() - new_w) / 2;
        let y_offset = (target.height() - new_h) / 2;

        let mut out = Mask::new(target);
        for yi in 0..new_h {
            let py = ((yi as f64 / ratio).floor() as u32).min(h - 1);
            for xi in 0..new_w {
                let px = ((xi as f64 / ratio).floor() as u32).min(w - 1);
                let value = self.get(rect.x() as u32 + px, rect.y() as u32 + py);
                out.set(x_offset + xi, y_offset + yi, value);
            }
        }

        let transform = FitTransform {
            source: rect,
            ratio,
            x_offset: x_offset as f32,
            y_offset: y_offset as f32,
        };
        (out, transform)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mask")
            .field("resolution", &self.resolution)
            .field("count", &self.count())
            .finish()
    }
}

/// Maps coordinates from a source frame into a mask produced by [`Mask::crop_fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitTransform {
    source: Rect,
    ratio: f64,
    x_offset: f32,
    y_offset: f32,
}

impl FitTransform {
    /// Returns the rectangle in the source frame that was cropped.
    pub fn source(&self) -> Rect {
        self.source
    }

    /// Returns the uniform scale factor from source pixels to mask pixels.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Maps a source-frame coordinate into the fitted mask.
    ///
    /// The result may lie outside of the mask if the input lies outside of the cropped area.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let ratio = self.ratio as f32;
        (
            self.x_offset + (x - self.source.x() as f32) * ratio,
            self.y_offset + (y - self.source.y() as f32) * ratio,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_rect() {
        let mut mask = Mask::new(Resolution::new(10, 10));
        assert_eq!(mask.bounding_rect(), None);
        assert!(mask.is_empty());

        mask.set(2, 3, true);
        mask.set(6, 4, true);
        assert_eq!(mask.count(), 2);
        assert_eq!(mask.bounding_rect(), Some(Rect::from_corners((2, 3), (6, 4))));
        assert_eq!(mask.iter_set().collect::<Vec<_>>(), [(2, 3), (6, 4)]);

        mask.clear();
        assert!(mask.is_empty());
    }

    #[test]
    fn test_contains_signed() {
        let mask = Mask::from_fn(Resolution::new(2, 2), |_, _| true);
        assert!(mask.contains(0, 0));
        assert!(mask.contains(1, 1));
        assert!(!mask.contains(-1, 0));
        assert!(!mask.contains(2, 0));
    }

    #[test]
    fn test_crop_fit_wide() {
        // A 20x10 block in a larger mask, fitted into 24x24 with a border of 2.
        let source = Mask::from_fn(Resolution::new(40, 30), |x, y| {
            (5..25).contains(&x) && (10..20).contains(&y)
        });
        let rect = source.bounding_rect().unwrap();
        assert_eq!(rect, Rect::from_top_left(5, 10, 20, 10));

        let (fitted, transform) = source.crop_fit(rect, Resolution::new(24, 24), 2);
        assert_eq!(fitted.resolution(), Resolution::new(24, 24));
        assert_eq!(transform.ratio(), 1.0);
        // 20x10 centered in 24x24 -> x offset 2, y offset 7
        assert_eq!(fitted.bounding_rect(), Some(Rect::from_top_left(2, 7, 20, 10)));
        assert_eq!(fitted.count(), 200);

        assert_eq!(transform.apply(5.0, 10.0), (2.0, 7.0));
        assert_eq!(transform.apply(24.0, 19.0), (21.0, 16.0));
    }

    #[test]
    fn test_crop_fit_scales_up() {
        let source = Mask::from_fn(Resolution::new(8, 8), |x, y| x < 4 && y < 2);
        let (fitted, transform) =
            source.crop_fit(Rect::from_top_left(0, 0, 4, 2), Resolution::new(16, 16), 0);
        assert_eq!(transform.ratio(), 4.0);
        assert_eq!(fitted.bounding_rect(), Some(Rect::from_top_left(0, 4, 16, 8)));
        assert_eq!(fitted.count(), 16 * 8);
        assert_eq!(transform.apply(2.0, 1.0), (8.0, 8.0));
    }

    #[test]
    fn test_luma_round_trip() {
        let mask = Mask::from_fn(Resolution::new(5, 4), |x, y| (x + y) % 3 == 0);
        let image = mask.to_luma();
        assert_eq!(image.get_pixel(0, 0).0[0], 255);
        assert_eq!(image.get_pixel(1, 0).0[0], 0);
        assert_eq!(Mask::from_luma(&image), mask);
    }
}
