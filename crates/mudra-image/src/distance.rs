//! Euclidean distance transform.

use std::fmt;

use image::imageops;
use imageproc::distance_transform::euclidean_squared_distance_transform;

use crate::{Mask, Resolution};

/// Per-pixel Euclidean distance from every set pixel of a [`Mask`] to the closest unset pixel.
///
/// Everything outside of the mask counts as unset, so a region touching the mask edge has a
/// distance of 1 along that edge. Unset pixels have a distance of 0.
#[derive(Clone)]
pub struct DistanceMap {
    resolution: Resolution,
    /// Squared distances. These are small integers, so ties compare exactly.
    squared: Box<[f32]>,
}

impl DistanceMap {
    pub fn compute(mask: &Mask) -> Self {
        // The transform measures the distance to the nearest non-zero pixel, so the background
        // (including a one pixel margin standing in for the outside) has to be the bright part.
        let mut background = mask.to_padded_luma(1);
        imageops::invert(&mut background);
        let transform = euclidean_squared_distance_transform(&background);

        let resolution = mask.resolution();
        let mut squared = vec![0.0; resolution.num_pixels()].into_boxed_slice();
        for y in 0..resolution.height() {
            for x in 0..resolution.width() {
                squared[resolution.index(x, y)] = transform.get_pixel(x + 1, y + 1).0[0] as f32;
            }
        }

        Self {
            resolution,
            squared,
        }
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Returns the distance of the pixel at `(x, y)` to the nearest unset pixel.
    #[inline]
    #[track_caller]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.squared[self.resolution.index(x, y)].sqrt()
    }

    /// Returns the largest distance in the map (`0.0` if the mask was empty).
    pub fn max(&self) -> f32 {
        self.squared.iter().copied().fold(0.0, f32::max).sqrt()
    }

    /// Returns all pixels attaining the largest distance, row by row.
    ///
    /// Returns an empty list if the mask was empty.
    pub fn maxima(&self) -> Vec<(u32, u32)> {
        let max = self.squared.iter().copied().fold(0.0, f32::max);
        if max <= 0.0 {
            return Vec::new();
        }
        let width = self.resolution.width() as usize;
        self.squared
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == max)
            .map(|(i, _)| ((i % width) as u32, (i / width) as u32))
            .collect()
    }
}

impl fmt::Debug for DistanceMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistanceMap")
            .field("resolution", &self.resolution)
            .field("max", &self.max())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_square() {
        let mask = Mask::from_fn(Resolution::new(5, 5), |_, _| true);
        let map = DistanceMap::compute(&mask);
        assert_eq!(map.get(2, 2), 3.0);
        assert_eq!(map.get(0, 0), 1.0);
        assert_eq!(map.get(1, 2), 2.0);
        assert_eq!(map.max(), 3.0);
        assert_eq!(map.maxima(), [(2, 2)]);
    }

    #[test]
    fn test_background_is_zero() {
        let mask = Mask::from_fn(Resolution::new(7, 7), |x, y| x >= 1 && y >= 1);
        let map = DistanceMap::compute(&mask);
        assert_eq!(map.get(0, 0), 0.0);
        assert_eq!(map.get(0, 5), 0.0);
        assert_eq!(map.get(1, 1), 1.0);
        assert_eq!(map.get(2, 3), 2.0);
    }

    #[test]
    fn test_diagonal() {
        // Single background pixel in the top left, everything else is far from the mask edges.
        let res = Resolution::new(40, 40);
        let mask = Mask::from_fn(res, |x, y| !(x == 10 && y == 10));
        let map = DistanceMap::compute(&mask);
        assert_relative_eq!(map.get(13, 14), 5.0);
        assert_relative_eq!(map.get(11, 11), 2.0f32.sqrt());
    }

    #[test]
    fn test_empty() {
        let map = DistanceMap::compute(&Mask::new(Resolution::new(4, 3)));
        assert_eq!(map.max(), 0.0);
        assert!(map.maxima().is_empty());
    }

    #[test]
    fn test_matches_brute_force() {
        let mut rng = fastrand::Rng::with_seed(0x5eed);
        let res = Resolution::new(17, 11);
        let mask = Mask::from_fn(res, |_, _| rng.u8(..) < 200);
        let map = DistanceMap::compute(&mask);

        for y in 0..res.height() as i32 {
            for x in 0..res.width() as i32 {
                let expected = if mask.contains(x, y) {
                    let mut best = i32::MAX;
                    for by in -1..=res.height() as i32 {
                        for bx in -1..=res.width() as i32 {
                            if !mask.contains(bx, by) {
                                best = best.min((bx - x).pow(2) + (by - y).pow(2));
                            }
                        }
                    }
                    (best as f32).sqrt()
                } else {
                    0.0
                };
                assert_relative_eq!(map.get(x as u32, y as u32), expected);
            }
        }
    }
}
