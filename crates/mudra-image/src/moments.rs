//! Image moments and moment-based shape comparison.

use crate::Mask;

/// Raster moments of a binary region up to third order.
///
/// Every set pixel contributes a unit mass at its integer coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    m00: f64,
    centroid: (f64, f64),
    mu20: f64,
    mu11: f64,
    mu02: f64,
    mu30: f64,
    mu21: f64,
    mu12: f64,
    mu03: f64,
}

impl Moments {
    pub fn of_mask(mask: &Mask) -> Self {
        let (mut m00, mut m10, mut m01) = (0.0, 0.0, 0.0);
        for (x, y) in mask.iter_set() {
            m00 += 1.0;
            m10 += f64::from(x);
            m01 += f64::from(y);
        }

        let mut moments = Self {
            m00,
            centroid: (0.0, 0.0),
            mu20: 0.0,
            mu11: 0.0,
            mu02: 0.0,
            mu30: 0.0,
            mu21: 0.0,
            mu12: 0.0,
            mu03: 0.0,
        };
        if m00 == 0.0 {
            return moments;
        }

        let (cx, cy) = (m10 / m00, m01 / m00);
        moments.centroid = (cx, cy);
        for (x, y) in mask.iter_set() {
            let (dx, dy) = (f64::from(x) - cx, f64::from(y) - cy);
            moments.mu20 += dx * dx;
            moments.mu11 += dx * dy;
            moments.mu02 += dy * dy;
            moments.mu30 += dx * dx * dx;
            moments.mu21 += dx * dx * dy;
            moments.mu12 += dx * dy * dy;
            moments.mu03 += dy * dy * dy;
        }
        moments
    }

    /// Returns the area (number of pixels) of the region.
    pub fn area(&self) -> f64 {
        self.m00
    }

    /// Returns the center of mass, or `None` for an empty region.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        (self.m00 > 0.0).then_some(self.centroid)
    }

    /// Returns the angle (in radians, image coordinates) of the region's major axis.
    ///
    /// The result is in `-π/2..=π/2`. Regions without a dominant axis (eg. disks) yield `0.0`.
    pub fn orientation(&self) -> f64 {
        0.5 * f64::atan2(2.0 * self.mu11, self.mu20 - self.mu02)
    }

    /// Computes the 7 Hu moment invariants of the region.
    ///
    /// These are invariant under translation, scale and rotation. An empty region yields all
    /// zeros.
    pub fn hu(&self) -> [f64; 7] {
        if self.m00 == 0.0 {
            return [0.0; 7];
        }

        let norm2 = self.m00 * self.m00;
        let norm3 = norm2 * self.m00.sqrt();
        let (n20, n11, n02) = (self.mu20 / norm2, self.mu11 / norm2, self.mu02 / norm2);
        let (n30, n21, n12, n03) = (
            self.mu30 / norm3,
            self.mu21 / norm3,
            self.mu12 / norm3,
            self.mu03 / norm3,
        );

        let t0 = n30 + n12;
        let t1 = n21 + n03;
        let q0 = t0 * t0;
        let q1 = t1 * t1;
        let s = n30 - 3.0 * n12;
        let d = 3.0 * n21 - n03;

        [
            n20 + n02,
            (n20 - n02).powi(2) + 4.0 * n11 * n11,
            s * s + d * d,
            q0 + q1,
            s * t0 * (q0 - 3.0 * q1) + d * t1 * (3.0 * q0 - q1),
            (n20 - n02) * (q0 - q1) + 4.0 * n11 * t0 * t1,
            d * t0 * (q0 - 3.0 * q1) - s * t1 * (3.0 * q0 - q1),
        ]
    }
}

/// Selects how [`match_shapes`] combines per-invariant differences.
///
/// With `mᵢ = sign(hᵢ) · log₁₀|hᵢ|` computed from the Hu invariants `hᵢ` of both shapes:
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeMatchMethod {
    /// `Σ |1/mᵢᴬ - 1/mᵢᴮ|`
    I1,
    /// `Σ |mᵢᴬ - mᵢᴮ|`
    I2,
    /// `max |(mᵢᴬ - mᵢᴮ) / mᵢᴬ|`
    I3,
}

/// Invariants smaller than this (in magnitude) in either shape are ignored.
const HU_EPSILON: f64 = 1e-5;

/// Computes a dissimilarity score between two regions from their Hu invariants.
///
/// Identical shapes score `0.0`. The score is not symmetric for [`ShapeMatchMethod::I3`].
pub fn match_shapes(a: &Moments, b: &Moments, method: ShapeMatchMethod) -> f64 {
    let (ha, hb) = (a.hu(), b.hu());
    let mut result: f64 = 0.0;

    for (&ha, &hb) in ha.iter().zip(&hb) {
        if ha.abs() <= HU_EPSILON || hb.abs() <= HU_EPSILON {
            continue;
        }
        let ma = ha.signum() * ha.abs().log10();
        let mb = hb.signum() * hb.abs().log10();

        match method {
            ShapeMatchMethod::I1 => result += (1.0 / ma - 1.0 / mb).abs(),
            ShapeMatchMethod::I2 => result += (ma - mb).abs(),
            ShapeMatchMethod::I3 => result = result.max(((ma - mb) / ma).abs()),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::Resolution;

    fn disk(res: Resolution, cx: f64, cy: f64, r: f64) -> Mask {
        Mask::from_fn(res, |x, y| {
            (f64::from(x) - cx).powi(2) + (f64::from(y) - cy).powi(2) <= r * r
        })
    }

    fn bar(res: Resolution, x0: u32, y0: u32, w: u32, h: u32) -> Mask {
        Mask::from_fn(res, |x, y| {
            (x0..x0 + w).contains(&x) && (y0..y0 + h).contains(&y)
        })
    }

    #[test]
    fn test_centroid_and_area() {
        let mask = bar(Resolution::new(10, 10), 2, 4, 4, 2);
        let moments = Moments::of_mask(&mask);
        assert_eq!(moments.area(), 8.0);
        assert_eq!(moments.centroid(), Some((3.5, 4.5)));
        assert_eq!(Moments::of_mask(&Mask::new(Resolution::new(2, 2))).centroid(), None);
    }

    #[test]
    fn test_hu_rectangle() {
        // For a continuous w*h rectangle, h0 = (w² + h²) / (12wh).
        let mask = bar(Resolution::new(64, 64), 10, 20, 40, 10);
        let hu = Moments::of_mask(&mask).hu();
        let expected = (40.0f64.powi(2) + 10.0f64.powi(2) - 2.0) / (12.0 * 400.0);
        assert_relative_eq!(hu[0], expected, epsilon = 1e-9);
        // Point symmetric shapes have vanishing odd moments.
        assert_relative_eq!(hu[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_orientation() {
        let res = Resolution::new(40, 40);
        assert_relative_eq!(Moments::of_mask(&bar(res, 5, 18, 30, 4)).orientation(), 0.0);
        assert_relative_eq!(
            Moments::of_mask(&bar(res, 18, 5, 4, 30)).orientation().abs(),
            std::f64::consts::FRAC_PI_2
        );
        let diagonal = Mask::from_fn(res, |x, y| (x as i32 - y as i32).abs() <= 1);
        assert_relative_eq!(
            Moments::of_mask(&diagonal).orientation(),
            std::f64::consts::FRAC_PI_4,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_match_shapes_invariance() {
        let res = Resolution::new(80, 80);
        let horizontal = Moments::of_mask(&bar(res, 10, 30, 40, 12));
        let vertical = Moments::of_mask(&bar(res, 30, 10, 12, 40));
        let shifted = Moments::of_mask(&bar(res, 25, 50, 40, 12));

        for method in [ShapeMatchMethod::I1, ShapeMatchMethod::I2, ShapeMatchMethod::I3] {
            assert_eq!(match_shapes(&horizontal, &horizontal, method), 0.0);
            assert_relative_eq!(match_shapes(&horizontal, &shifted, method), 0.0, epsilon = 1e-9);
            assert_relative_eq!(match_shapes(&horizontal, &vertical, method), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_match_shapes_discriminates() {
        let res = Resolution::new(80, 80);
        let round = Moments::of_mask(&disk(res, 40.0, 40.0, 20.0));
        let bigger = Moments::of_mask(&disk(res, 40.0, 40.0, 30.0));
        let long = Moments::of_mask(&bar(res, 5, 35, 70, 8));

        let similar = match_shapes(&round, &bigger, ShapeMatchMethod::I3);
        let different = match_shapes(&round, &long, ShapeMatchMethod::I3);
        assert!(similar < 0.05, "{similar}");
        assert!(different > 0.3, "{different}");
    }
}
