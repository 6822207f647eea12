//! Depth frames.

use std::fmt;

use image::{Rgb, RgbImage};

use crate::Resolution;

/// The band of depth values (in millimeters) that a depth sensor reports reliably.
///
/// Samples outside of this band are noise (too close to or too far away from the sensor) and must
/// not be used for any region decisions.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DepthRange {
    min: u16,
    max: u16,
}

impl DepthRange {
    /// The reliable range of the Kinect v2 depth sensor: 500 mm to 4500 mm.
    pub const KINECT: Self = Self {
        min: 500,
        max: 4500,
    };

    /// Creates a depth range covering `min..=max` millimeters.
    ///
    /// Returns an error if `min` is greater than `max`.
    pub fn new(min: u16, max: u16) -> anyhow::Result<Self> {
        if min > max {
            anyhow::bail!("invalid depth range: minimum {min} mm exceeds maximum {max} mm");
        }
        Ok(Self { min, max })
    }

    #[inline]
    pub fn min(&self) -> u16 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Returns whether `depth` lies inside of this (inclusive) range.
    #[inline]
    pub fn contains(&self, depth: u16) -> bool {
        depth >= self.min && depth <= self.max
    }
}

impl Default for DepthRange {
    fn default() -> Self {
        Self::KINECT
    }
}

impl fmt::Debug for DepthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={} mm", self.min, self.max)
    }
}

/// A row-major grid of 16-bit depth samples, in millimeters.
#[derive(Clone, PartialEq, Eq)]
pub struct DepthFrame {
    resolution: Resolution,
    data: Box<[u16]>,
}

impl DepthFrame {
    /// Creates a depth frame of the given resolution with every sample set to `0`.
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            data: vec![0; resolution.num_pixels()].into_boxed_slice(),
        }
    }

    /// Wraps an existing buffer of depth samples.
    ///
    /// Returns an error if the number of samples does not match `resolution`.
    pub fn from_samples(resolution: Resolution, data: Vec<u16>) -> anyhow::Result<Self> {
        if data.len() != resolution.num_pixels() {
            anyhow::bail!(
                "depth buffer holds {} samples, but a {} frame needs {}",
                data.len(),
                resolution,
                resolution.num_pixels()
            );
        }
        Ok(Self {
            resolution,
            data: data.into_boxed_slice(),
        })
    }

    /// Creates a depth frame by invoking `f` with the coordinates of every pixel.
    pub fn from_fn(resolution: Resolution, mut f: impl FnMut(u32, u32) -> u16) -> Self {
        let mut frame = Self::new(resolution);
        for y in 0..resolution.height() {
            for x in 0..resolution.width() {
                frame.set(x, y, f(x, y));
            }
        }
        frame
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

    /// Returns the depth sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the frame.
    #[inline]
    #[track_caller]
    pub fn get(&self, x: u32, y: u32) -> u16 {
        self.data[self.resolution.index(x, y)]
    }

    #[inline]
    #[track_caller]
    pub fn set(&mut self, x: u32, y: u32, depth: u16) {
        let index = self.resolution.index(x, y);
        self.data[index] = depth;
    }

    /// Returns the raw sample buffer.
    pub fn samples(&self) -> &[u16] {
        &self.data
    }

    /// Renders the frame for display.
    ///
    /// Samples outside of `range` are drawn white, everything else is drawn in shades of blue that
    /// get brighter with increasing depth.
    pub fn visualize(&self, range: DepthRange) -> RgbImage {
        let span = u32::from(range.max() - range.min()).max(1);
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let depth = self.get(x, y);
            if range.contains(depth) {
                let intensity = u32::from(depth - range.min()) * 255 / span;
                Rgb([0, 0, intensity as u8])
            } else {
                Rgb([255, 255, 255])
            }
        })
    }
}

impl fmt::Debug for DepthFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthFrame")
            .field("resolution", &self.resolution)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range() {
        let range = DepthRange::new(500, 4500).unwrap();
        assert!(range.contains(500));
        assert!(range.contains(4500));
        assert!(!range.contains(499));
        assert!(!range.contains(4501));
        assert!(DepthRange::new(10, 9).is_err());
        assert_eq!(DepthRange::default(), DepthRange::KINECT);
    }

    #[test]
    fn test_from_samples() {
        let res = Resolution::new(3, 2);
        let frame = DepthFrame::from_samples(res, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(frame.get(0, 0), 1);
        assert_eq!(frame.get(2, 0), 3);
        assert_eq!(frame.get(0, 1), 4);
        assert_eq!(frame.get(2, 1), 6);

        assert!(DepthFrame::from_samples(res, vec![0; 5]).is_err());
    }

    #[test]
    fn test_visualize() {
        let frame = DepthFrame::from_fn(Resolution::new(3, 1), |x, _| [100, 500, 4500][x as usize]);
        let img = frame.visualize(DepthRange::KINECT);
        assert_eq!(img.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(2, 0), &Rgb([0, 0, 255]));
    }
}
