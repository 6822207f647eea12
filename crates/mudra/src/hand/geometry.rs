//! Palm and finger localization.

use std::f32::consts::TAU;

use nalgebra::Point2;

use crate::{
    image::{components, Connectivity, DistanceMap, Mask},
    joint::JointKind,
};

use super::{BaseOrientation, Finger, FingerWidthTable, HandRegion, ImpliedFinger};

/// How to pick the palm center when several pixels are equally far from the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PalmTieBreak {
    /// Use the candidate closest to the hand joint.
    ///
    /// Falls back to [`PalmTieBreak::Average`] when the hand joint is unknown.
    #[default]
    NearestToHandJoint,
    /// Use the average of all candidates, or the candidate closest to it if the average is not
    /// part of the hand.
    Average,
}

/// The direction the fingers of a hand are pointing in, in mask coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    /// No fingers are visible.
    Unknown,
}

/// Tunable parameters of the [`HandAnalyzer`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryOptions {
    outer_radius_multiplier: f32,
    radius_samples: u32,
    leakage_tolerance: f32,
    min_finger_area: usize,
    max_fingers: u32,
    finger_widths: FingerWidthTable,
    palm_tie_break: PalmTieBreak,
    base_orientation: BaseOrientation,
}

impl GeometryOptions {
    /// Ratio of the finger search radius to the palm's inner radius.
    pub const DEFAULT_OUTER_RADIUS_MULTIPLIER: f32 = 1.6;
    /// Number of points sampled on a circle when testing whether it fits inside the palm.
    pub const DEFAULT_RADIUS_SAMPLES: u32 = 180;
    /// Fraction of sampled circle points that may fall outside of the hand.
    pub const DEFAULT_LEAKAGE_TOLERANCE: f32 = 0.05;
    /// Blobs with fewer pixels are treated as noise.
    pub const DEFAULT_MIN_FINGER_AREA: usize = 15;
    /// Finger counts above this are unreliable and discarded.
    pub const DEFAULT_MAX_FINGERS: u32 = 5;

    pub fn outer_radius_multiplier(mut self, multiplier: f32) -> Self {
        self.outer_radius_multiplier = multiplier;
        self
    }

    pub fn radius_samples(mut self, samples: u32) -> Self {
        self.radius_samples = samples;
        self
    }

    pub fn leakage_tolerance(mut self, fraction: f32) -> Self {
        self.leakage_tolerance = fraction;
        self
    }

    pub fn min_finger_area(mut self, pixels: usize) -> Self {
        self.min_finger_area = pixels;
        self
    }

    pub fn max_fingers(mut self, fingers: u32) -> Self {
        self.max_fingers = fingers;
        self
    }

    pub fn finger_widths(mut self, table: FingerWidthTable) -> Self {
        self.finger_widths = table;
        self
    }

    pub fn palm_tie_break(mut self, tie_break: PalmTieBreak) -> Self {
        self.palm_tie_break = tie_break;
        self
    }

    pub fn base_orientation(mut self, orientation: BaseOrientation) -> Self {
        self.base_orientation = orientation;
        self
    }
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            outer_radius_multiplier: Self::DEFAULT_OUTER_RADIUS_MULTIPLIER,
            radius_samples: Self::DEFAULT_RADIUS_SAMPLES,
            leakage_tolerance: Self::DEFAULT_LEAKAGE_TOLERANCE,
            min_finger_area: Self::DEFAULT_MIN_FINGER_AREA,
            max_fingers: Self::DEFAULT_MAX_FINGERS,
            finger_widths: FingerWidthTable::default(),
            palm_tie_break: PalmTieBreak::default(),
            base_orientation: BaseOrientation::default(),
        }
    }
}

/// Palm center and radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palm {
    center: Point2<i32>,
    inner_radius: u32,
    outer_radius: f32,
}

impl Palm {
    /// Returns the palm center, a pixel inside the hand mask.
    pub fn center(&self) -> Point2<i32> {
        self.center
    }

    /// Returns the radius of the largest circle around the center that stays inside the hand.
    pub fn inner_radius(&self) -> u32 {
        self.inner_radius
    }

    /// Returns the radius outside of which fingers are searched.
    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }
}

/// Everything the [`HandAnalyzer`] found out about a hand.
#[derive(Debug, Clone, PartialEq)]
pub struct HandGeometry {
    palm: Palm,
    fingers: Vec<Finger>,
    implied: Vec<ImpliedFinger>,
    rejected: Vec<Point2<f32>>,
    direction: Direction,
}

impl HandGeometry {
    pub fn palm(&self) -> &Palm {
        &self.palm
    }

    /// Returns the finger blobs.
    ///
    /// Empty if more fingers than allowed were found.
    pub fn fingers(&self) -> &[Finger] {
        &self.fingers
    }

    /// Returns the individual fingers, after splitting up merged blobs.
    pub fn implied_fingers(&self) -> &[ImpliedFinger] {
        &self.implied
    }

    /// Returns the tips of blobs that were discarded as part of the wrist or forearm.
    pub fn rejected_tips(&self) -> &[Point2<f32>] {
        &self.rejected
    }

    /// Returns the total number of fingers.
    pub fn finger_count(&self) -> u32 {
        self.fingers.iter().map(|f| f.count).sum()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }
}

/// Locates palm and fingers in a [`HandRegion`].
pub struct HandAnalyzer {
    options: GeometryOptions,
}

impl HandAnalyzer {
    pub fn new(options: GeometryOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GeometryOptions {
        &self.options
    }

    /// Analyzes a hand region.
    ///
    /// Returns `None` if the region is empty or too thin to contain a palm.
    pub fn analyze(&self, region: &HandRegion) -> Option<HandGeometry> {
        let mask = region.mask();
        let Some(center) = self.palm_center(region) else {
            log::trace!("no palm found in empty hand mask");
            return None;
        };
        let Some(inner_radius) = self.inner_radius(mask, center) else {
            log::trace!("no palm circle fits around {center:?}");
            return None;
        };
        let palm = Palm {
            center,
            inner_radius,
            outer_radius: inner_radius as f32 * self.options.outer_radius_multiplier,
        };

        let (fingers, rejected) = self.extract_fingers(region, &palm);
        let implied = fingers
            .iter()
            .flat_map(|f| f.subdivide(self.options.base_orientation))
            .collect::<Vec<_>>();
        let direction = direction(mask, &implied);

        Some(HandGeometry {
            palm,
            fingers,
            implied,
            rejected,
            direction,
        })
    }

    fn palm_center(&self, region: &HandRegion) -> Option<Point2<i32>> {
        let candidates = DistanceMap::compute(region.mask()).maxima();
        if candidates.is_empty() {
            return None;
        }
        let candidates = candidates
            .into_iter()
            .map(|(x, y)| Point2::new(x as i32, y as i32))
            .collect::<Vec<_>>();

        let hand = match self.options.palm_tie_break {
            PalmTieBreak::NearestToHandJoint => region.joint(JointKind::Hand),
            PalmTieBreak::Average => None,
        };
        if let Some(hand) = hand {
            return nearest(&candidates, hand);
        }

        let sum = candidates
            .iter()
            .fold(Point2::origin(), |acc: Point2<f32>, c| {
                acc + c.cast::<f32>().coords
            });
        let average = sum / candidates.len() as f32;
        let rounded = Point2::new(average.x.round() as i32, average.y.round() as i32);
        if region.mask().contains(rounded.x, rounded.y) {
            Some(rounded)
        } else {
            nearest(&candidates, average)
        }
    }

    /// Finds the largest radius whose circle around `center` stays inside the hand.
    fn inner_radius(&self, mask: &Mask, center: Point2<i32>) -> Option<u32> {
        let samples = self.options.radius_samples.max(1);
        let tolerance = (samples as f32 * self.options.leakage_tolerance).floor() as u32;

        let max_radius = [
            center.x,
            center.y,
            mask.width() as i32 - 1 - center.x,
            mask.height() as i32 - 1 - center.y,
        ]
        .into_iter()
        .min()
        .unwrap_or(0);

        (1..=max_radius)
            .rev()
            .find(|&r| {
                let mut leaks = 0;
                for i in 0..samples {
                    let angle = i as f32 * TAU / samples as f32;
                    let x = (center.x as f32 + r as f32 * angle.cos()).round() as i32;
                    let y = (center.y as f32 + r as f32 * angle.sin()).round() as i32;
                    if !mask.contains(x, y) {
                        leaks += 1;
                        if leaks > tolerance {
                            return false;
                        }
                    }
                }
                true
            })
            .map(|r| r as u32)
    }

    fn extract_fingers(
        &self,
        region: &HandRegion,
        palm: &Palm,
    ) -> (Vec<Finger>, Vec<Point2<f32>>) {
        let mask = region.mask();
        let center = palm.center;
        let outer_sq = palm.outer_radius * palm.outer_radius;
        let outside = |x: i32, y: i32| {
            let (dx, dy) = ((x - center.x) as f32, (y - center.y) as f32);
            dx * dx + dy * dy >= outer_sq
        };
        let wrist = region.joint(JointKind::Wrist);

        // Finger candidates are the 4-connected blobs of the hand outside of the outer circle.
        let beyond_palm = Mask::from_fn(mask.resolution(), |x, y| {
            mask.get(x, y) && outside(x as i32, y as i32)
        });

        let mut fingers = Vec::new();
        let mut rejected = Vec::new();
        let mut total = 0;

        for blob in components(&beyond_palm, Connectivity::Four) {
            if blob.len() < self.options.min_finger_area {
                log::trace!("discarding {}-pixel blob at {:?}", blob.len(), blob[0]);
                continue;
            }
            let blob = blob
                .into_iter()
                .map(|(x, y)| (x as i32, y as i32))
                .collect::<Vec<_>>();

            let tip = blob
                .iter()
                .copied()
                .fold(None, |best: Option<((i32, i32), i32)>, (x, y)| {
                    let d = (x - center.x).pow(2) + (y - center.y).pow(2);
                    match best {
                        Some((_, bd)) if bd >= d => best,
                        _ => Some(((x, y), d)),
                    }
                })
                .map(|((x, y), _)| Point2::new(x as f32, y as f32));
            let Some(tip) = tip else { continue };

            // Base candidates: blob pixels with a 4-neighbor inside the outer circle.
            let base_candidates = blob
                .iter()
                .copied()
                .filter(|&(x, y)| {
                    [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]
                        .into_iter()
                        .any(|(nx, ny)| !outside(nx, ny))
                })
                .map(|(x, y)| Point2::new(x as f32, y as f32))
                .collect::<Vec<_>>();
            let Some(base) = farthest_pair(&base_candidates) else {
                log::trace!("finger blob at {tip:?} has no base");
                continue;
            };
            let base_width = nalgebra::distance(&base[0], &base[1]);
            if base_width <= 1.0 {
                log::trace!("finger blob at {tip:?} has degenerate base width {base_width}");
                continue;
            }

            if let Some(wrist) = wrist {
                if nalgebra::distance(&wrist, &tip) < palm.outer_radius {
                    log::trace!("finger blob at {tip:?} is part of the wrist");
                    rejected.push(tip);
                    continue;
                }
            }

            let Some(ratio) = self
                .options
                .finger_widths
                .ratio(base_width, palm.inner_radius)
            else {
                continue;
            };
            let count = self.options.finger_widths.count(ratio);
            total += count;
            if total > self.options.max_fingers {
                log::trace!("found more than {} fingers", self.options.max_fingers);
                return (Vec::new(), rejected);
            }

            fingers.push(Finger {
                tip,
                base,
                area: blob.len(),
                count,
            });
        }

        (fingers, rejected)
    }
}

fn nearest(candidates: &[Point2<i32>], target: Point2<f32>) -> Option<Point2<i32>> {
    candidates
        .iter()
        .copied()
        .fold(None, |best: Option<(Point2<i32>, f32)>, c| {
            let d = nalgebra::distance_squared(&c.cast::<f32>(), &target);
            match best {
                Some((_, bd)) if bd <= d => best,
                _ => Some((c, d)),
            }
        })
        .map(|(c, _)| c)
}

fn farthest_pair(points: &[Point2<f32>]) -> Option<[Point2<f32>; 2]> {
    let mut best = None;
    let mut best_d = -1.0;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let d = nalgebra::distance_squared(a, b);
            if d > best_d {
                best_d = d;
                best = Some([*a, *b]);
            }
        }
    }
    best
}

/// Classifies the average fingertip position by the closest edge midpoint of the mask.
fn direction(mask: &Mask, fingers: &[ImpliedFinger]) -> Direction {
    if fingers.is_empty() {
        return Direction::Unknown;
    }

    let sum = fingers
        .iter()
        .fold(Point2::origin(), |acc: Point2<f32>, f| acc + f.tip.coords);
    let average = sum / fingers.len() as f32;

    let (w, h) = (mask.width() as f32, mask.height() as f32);
    let edges = [
        (Direction::Up, Point2::new(w / 2.0, 0.0)),
        (Direction::Down, Point2::new(w / 2.0, h)),
        (Direction::Left, Point2::new(0.0, h / 2.0)),
        (Direction::Right, Point2::new(w, h / 2.0)),
    ];
    // Strict comparison keeps the first of several equally close edges.
    let mut best = (Direction::Unknown, f32::INFINITY);
    for (dir, midpoint) in edges {
        let d = nalgebra::distance(&average, &midpoint);
        if d < best.1 {
            best = (dir, d);
        }
    }
    best.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        image::{Rect, Resolution},
        test::{self, HandShape},
    };

    fn analyze(region: &HandRegion) -> HandGeometry {
        HandAnalyzer::new(GeometryOptions::default())
            .analyze(region)
            .unwrap()
    }

    #[test]
    fn test_open_hand() {
        let geometry = analyze(&HandShape::open().region());
        let palm = geometry.palm();
        assert!((17..=23).contains(&palm.inner_radius()), "{palm:?}");
        assert!((palm.center().x - 60).abs() <= 3, "{palm:?}");
        assert!((palm.center().y - 70).abs() <= 3, "{palm:?}");
        assert_eq!(geometry.finger_count(), 5);
        assert_eq!(geometry.fingers().len(), 5);
        assert_eq!(geometry.implied_fingers().len(), 5);
        assert_eq!(geometry.direction(), Direction::Up);
        assert!(geometry.rejected_tips().is_empty());
        for finger in geometry.fingers() {
            assert_eq!(finger.count(), 1);
            assert!(finger.area() >= GeometryOptions::DEFAULT_MIN_FINGER_AREA);
            assert!(nalgebra::distance(&finger.tip(), &Point2::new(60.0, 70.0)) > 45.0);
        }
    }

    #[test]
    fn test_fist() {
        let geometry = analyze(&HandShape::fist().region());
        assert_eq!(geometry.finger_count(), 0);
        assert_eq!(geometry.direction(), Direction::Unknown);
    }

    #[test]
    fn test_too_many_fingers() {
        let angles = [-165.0, -140.0, -115.0, -90.0, -65.0, -40.0, -15.0];
        let geometry = analyze(&HandShape::open().fingers(&angles).region());
        assert_eq!(geometry.finger_count(), 0);
        assert!(geometry.fingers().is_empty());
        assert_eq!(geometry.direction(), Direction::Unknown);
    }

    #[test]
    fn test_forearm_rejected() {
        let geometry = analyze(&HandShape::open().forearm().region());
        assert_eq!(geometry.finger_count(), 5);
        assert_eq!(geometry.rejected_tips().len(), 1);
        assert!(geometry.rejected_tips()[0].y > 100.0);
    }

    #[test]
    fn test_merged_fingers() {
        let geometry = analyze(
            &HandShape::fist()
                .finger(-90.0, test::FINGER_LENGTH, 20.0)
                .region(),
        );
        assert_eq!(geometry.fingers().len(), 1);
        assert_eq!(geometry.finger_count(), 2);
        let implied = geometry.implied_fingers();
        assert_eq!(implied.len(), 2);
        assert!((implied[0].base.x - implied[1].base.x).abs() > 5.0);
        assert_eq!(geometry.direction(), Direction::Up);
    }

    #[test]
    fn test_pointing_sideways() {
        let geometry = analyze(&HandShape::fist().fingers(&[0.0]).region());
        assert_eq!(geometry.finger_count(), 1);
        assert_eq!(geometry.direction(), Direction::Right);
        let geometry = analyze(&HandShape::fist().fingers(&[180.0]).region());
        assert_eq!(geometry.direction(), Direction::Left);
        // Pointing down, towards the wrist, is only possible without a known wrist position.
        let geometry = analyze(&HandShape::fist().without_wrist().fingers(&[90.0]).region());
        assert_eq!(geometry.direction(), Direction::Down);
    }

    #[test]
    fn test_noise_blobs_discarded() {
        let mut mask = HandShape::fist().mask();
        for y in 24..27 {
            for x in 59..62 {
                mask.set(x, y, true);
            }
        }
        let region = HandRegion::new(mask, Rect::from_top_left(0, 0, 120, 120))
            .with_joint(JointKind::Hand, Point2::new(60.0, 70.0))
            .with_joint(JointKind::Wrist, Point2::new(60.0, 100.0));

        let geometry = analyze(&region);
        assert_eq!(geometry.finger_count(), 0);
        assert!(geometry.fingers().is_empty());
        assert!(geometry.rejected_tips().is_empty());
    }

    #[test]
    fn test_leakage_tolerance() {
        // A disk of radius 22 with four one pixel wide radial slits cut into its rim.
        let center = Point2::new(60, 60);
        let mask = Mask::from_fn(Resolution::HAND, |x, y| {
            let (dx, dy) = (x as i32 - center.x, y as i32 - center.y);
            let d2 = dx * dx + dy * dy;
            d2 <= 22 * 22 && !(d2 >= 14 * 14 && (dx == 0 || dy == 0))
        });

        let tolerant = HandAnalyzer::new(GeometryOptions::default())
            .inner_radius(&mask, center)
            .unwrap();
        assert!(tolerant >= 20, "{tolerant}");

        let strict = HandAnalyzer::new(GeometryOptions::default().leakage_tolerance(0.0))
            .inner_radius(&mask, center)
            .unwrap();
        assert!(strict < 14, "{strict}");
    }

    #[test]
    fn test_palm_tie_break() {
        // A horizontal bar has a whole row of equally distant centers.
        let mask = Mask::from_fn(Resolution::HAND, |x, y| {
            (20..100).contains(&x) && (50..61).contains(&y)
        });
        let region = HandRegion::new(mask, Rect::from_top_left(0, 0, 120, 120))
            .with_joint(JointKind::Hand, Point2::new(30.0, 40.0));

        let nearest = HandAnalyzer::new(GeometryOptions::default())
            .analyze(&region)
            .unwrap();
        assert_eq!(nearest.palm().center().y, 55);
        assert!(nearest.palm().center().x < 40);

        let average = HandAnalyzer::new(
            GeometryOptions::default().palm_tie_break(PalmTieBreak::Average),
        )
        .analyze(&region)
        .unwrap();
        assert_eq!(average.palm().center(), Point2::new(60, 55));
    }

    #[test]
    fn test_empty_region() {
        let region = HandRegion::new(
            Mask::new(Resolution::HAND),
            Rect::from_top_left(0, 0, 1, 1),
        );
        assert!(HandAnalyzer::new(GeometryOptions::default())
            .analyze(&region)
            .is_none());
    }

    #[test]
    fn test_random_hands() {
        let mut rng = fastrand::Rng::with_seed(0xf1);
        let analyzer = HandAnalyzer::new(GeometryOptions::default());
        for _ in 0..40 {
            let mut shape = HandShape::fist();
            for _ in 0..rng.usize(0..9) {
                shape = shape.finger(
                    rng.f32() * 360.0 - 180.0,
                    30.0 + rng.f32() * 25.0,
                    3.0 + rng.f32() * 20.0,
                );
            }
            let region = shape.region();
            let Some(geometry) = analyzer.analyze(&region) else {
                continue;
            };
            assert!(geometry.finger_count() <= 5);
            let center = geometry.palm().center();
            assert!(region.mask().contains(center.x, center.y));
        }
    }
}
