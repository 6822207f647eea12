use nalgebra::Point2;

/// Maps the width of a finger blob's base to the number of fingers it contains.
///
/// Adjacent fingers that touch each other are segmented as a single blob. The width of the blob's
/// base, relative to the palm's inner diameter, tells how many fingers were merged.
///
/// These values are calibration-sensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerWidthTable {
    thresholds: [f32; 4],
    scale: f32,
    fallback: u32,
}

impl FingerWidthTable {
    /// Upper ratio bounds for blobs of 1, 2, 3 and 4 fingers.
    pub const DEFAULT_THRESHOLDS: [f32; 4] = [1.317, 2.315, 2.815, 4.0];
    /// Width of the palm, in fingers.
    pub const DEFAULT_SCALE: f32 = 4.0;
    /// Finger count assigned to blobs wider than the last threshold.
    pub const DEFAULT_FALLBACK: u32 = 1;

    pub fn new(thresholds: [f32; 4], scale: f32, fallback: u32) -> Self {
        Self {
            thresholds,
            scale,
            fallback,
        }
    }

    /// Computes the width ratio of a blob with the given base width.
    ///
    /// Returns `None` if `inner_radius` is zero.
    pub fn ratio(&self, base_width: f32, inner_radius: u32) -> Option<f32> {
        if inner_radius == 0 {
            return None;
        }
        Some(base_width * self.scale / (2 * inner_radius) as f32)
    }

    /// Returns the number of fingers in a blob with the given width ratio.
    pub fn count(&self, ratio: f32) -> u32 {
        self.thresholds
            .iter()
            .position(|&upper| ratio <= upper)
            .map_or(self.fallback, |i| i as u32 + 1)
    }
}

impl Default for FingerWidthTable {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_THRESHOLDS,
            Self::DEFAULT_SCALE,
            Self::DEFAULT_FALLBACK,
        )
    }
}

/// Decides in which order the fingers of a merged blob are laid out along its base.
///
/// The two base endpoints `a` and `b` are swapped if the signed area of the triangle `(b, a, tip)`
/// has the sign selected here. This is calibration-sensitive and depends on the handedness of the
/// mask coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseOrientation {
    /// Swap when the signed area is negative.
    #[default]
    Negative,
    /// Swap when the signed area is positive.
    Positive,
}

/// Twice the signed area of the triangle `(a, b, c)`.
pub(crate) fn orient(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> f32 {
    (b - a).perp(&(c - a))
}

/// A blob of one or more fingers sticking out of the palm.
#[derive(Debug, Clone, PartialEq)]
pub struct Finger {
    pub(crate) tip: Point2<f32>,
    pub(crate) base: [Point2<f32>; 2],
    pub(crate) area: usize,
    pub(crate) count: u32,
}

impl Finger {
    /// Returns the pixel of the blob farthest from the palm center.
    pub fn tip(&self) -> Point2<f32> {
        self.tip
    }

    /// Returns the endpoints of the blob's base, where it leaves the palm.
    pub fn base(&self) -> [Point2<f32>; 2] {
        self.base
    }

    pub fn base_width(&self) -> f32 {
        nalgebra::distance(&self.base[0], &self.base[1])
    }

    /// Returns the number of pixels in the blob.
    pub fn area(&self) -> usize {
        self.area
    }

    /// Returns how many fingers this blob was attributed.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Splits the blob into [`Finger::count`] fingers of equal width, placed side by side along
    /// the base.
    ///
    /// All implied fingers share the blob's tip.
    pub fn subdivide(&self, orientation: BaseOrientation) -> Vec<ImpliedFinger> {
        let [mut p1, mut p2] = self.base;
        let area = orient(p2, p1, self.tip);
        let swap = match orientation {
            BaseOrientation::Negative => area < 0.0,
            BaseOrientation::Positive => area > 0.0,
        };
        if swap {
            std::mem::swap(&mut p1, &mut p2);
        }

        let base_width = self.base_width();
        let count = self.count.max(1);
        let width = base_width / count as f32;
        let Some(dir) = (p1 - p2).try_normalize(f32::EPSILON) else {
            return vec![ImpliedFinger {
                tip: self.tip,
                base: p2,
                width,
            }];
        };

        (0..count)
            .map(|i| ImpliedFinger {
                tip: self.tip,
                base: p2 + dir * (width / 2.0 + i as f32 * width),
                width,
            })
            .collect()
    }
}

/// One finger of a (possibly merged) finger blob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpliedFinger {
    pub tip: Point2<f32>,
    pub base: Point2<f32>,
    pub width: f32,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_width_table() {
        let table = FingerWidthTable::default();
        assert_eq!(table.count(0.5), 1);
        assert_eq!(table.count(1.317), 1);
        assert_eq!(table.count(1.318), 2);
        assert_eq!(table.count(2.315), 2);
        assert_eq!(table.count(2.5), 3);
        assert_eq!(table.count(3.0), 4);
        assert_eq!(table.count(4.0), 4);
        assert_eq!(table.count(4.5), 1);

        assert_relative_eq!(table.ratio(10.0, 20).unwrap(), 1.0);
        assert_eq!(table.ratio(10.0, 0), None);
    }

    #[test]
    fn test_orient() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert!(orient(a, b, Point2::new(0.0, 1.0)) > 0.0);
        assert!(orient(a, b, Point2::new(0.0, -1.0)) < 0.0);
        assert_eq!(orient(a, b, Point2::new(2.0, 0.0)), 0.0);
    }

    #[test]
    fn test_subdivide() {
        let finger = Finger {
            tip: Point2::new(15.0, 0.0),
            base: [Point2::new(0.0, 20.0), Point2::new(30.0, 20.0)],
            area: 300,
            count: 3,
        };
        // orient((30,20), (0,20), (15,0)) = (-30,0) x (-15,-20) = 600 > 0: no swap, so the
        // fingers are laid out starting at the second endpoint.
        let fingers = finger.subdivide(BaseOrientation::Negative);
        assert_eq!(fingers.len(), 3);
        assert_relative_eq!(fingers[0].base, Point2::new(25.0, 20.0));
        assert_relative_eq!(fingers[1].base, Point2::new(15.0, 20.0));
        assert_relative_eq!(fingers[2].base, Point2::new(5.0, 20.0));
        assert!(fingers.iter().all(|f| f.width == 10.0 && f.tip == finger.tip));

        let fingers = finger.subdivide(BaseOrientation::Positive);
        assert_relative_eq!(fingers[0].base, Point2::new(5.0, 20.0));
        assert_relative_eq!(fingers[2].base, Point2::new(25.0, 20.0));
    }

    #[test]
    fn test_subdivide_single() {
        let finger = Finger {
            tip: Point2::new(5.0, 0.0),
            base: [Point2::new(4.0, 10.0), Point2::new(8.0, 10.0)],
            area: 40,
            count: 1,
        };
        let fingers = finger.subdivide(BaseOrientation::default());
        assert_eq!(fingers.len(), 1);
        assert_relative_eq!(fingers[0].base, Point2::new(6.0, 10.0));
        assert_relative_eq!(fingers[0].width, 4.0);
    }
}
