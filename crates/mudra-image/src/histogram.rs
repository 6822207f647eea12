//! Radial boundary histograms.

use std::f64::consts::TAU;

use crate::{Contour, Moments};

/// A 2D histogram of the boundary points of a region, bucketed by angle and distance relative to
/// the region's centroid.
///
/// Angles are measured relative to the region's major axis, which makes the histogram invariant
/// under rotation. Distances are normalized by the largest distance, which makes it invariant
/// under scaling. The bins sum to `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialHistogram {
    bins: Vec<f64>,
}

impl RadialHistogram {
    /// Number of angular buckets.
    pub const ANGLE_BINS: usize = 8;
    /// Number of distance buckets.
    pub const DISTANCE_BINS: usize = 8;

    /// Builds the histogram of `contour`, using `moments` (of the same region) to obtain the
    /// centroid and major axis.
    ///
    /// Returns `None` if the contour or the region is empty.
    pub fn new(contour: &Contour, moments: &Moments) -> Option<Self> {
        let (cx, cy) = moments.centroid()?;
        if contour.is_empty() {
            return None;
        }
        let axis = moments.orientation();

        let polar = contour
            .points()
            .iter()
            .map(|&(x, y)| {
                let (dx, dy) = (f64::from(x) - cx, f64::from(y) - cy);
                let angle = (dy.atan2(dx) - axis).rem_euclid(TAU);
                (angle, dx.hypot(dy))
            })
            .collect::<Vec<_>>();
        let max_distance = polar.iter().map(|(_, d)| *d).fold(0.0, f64::max);

        let mut bins = vec![0.0; Self::ANGLE_BINS * Self::DISTANCE_BINS];
        let weight = 1.0 / polar.len() as f64;
        for (angle, distance) in polar {
            let a = ((angle / TAU * Self::ANGLE_BINS as f64) as usize).min(Self::ANGLE_BINS - 1);
            let d = if max_distance > 0.0 {
                ((distance / max_distance * Self::DISTANCE_BINS as f64) as usize)
                    .min(Self::DISTANCE_BINS - 1)
            } else {
                0
            };
            bins[a * Self::DISTANCE_BINS + d] += weight;
        }

        Some(Self { bins })
    }

    /// Returns the normalized bin values, angle-major.
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Computes the Bhattacharyya distance between two histograms.
    ///
    /// The result lies in `0.0..=1.0`, with `0.0` meaning identical distributions.
    pub fn compare(&self, other: &Self) -> f64 {
        let coefficient: f64 = self
            .bins
            .iter()
            .zip(&other.bins)
            .map(|(a, b)| (a * b).sqrt())
            .sum();
        (1.0 - coefficient).max(0.0).sqrt()
    }
}
