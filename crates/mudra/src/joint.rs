//! Skeletal joints, hand sides and projection into depth space.
//!
//! Joint positions are in *camera space*, in meters: X points to the right, Y points up, and Z
//! points from the sensor into the scene.

use std::{fmt, str::FromStr};

use nalgebra::{Point2, Point3};

/// The joints of one arm/hand side that gesture recognition looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKind {
    Hand,
    Wrist,
    HandTip,
    Thumb,
    Shoulder,
    Elbow,
    Head,
    Spine,
}

impl JointKind {
    pub const ALL: [Self; 8] = [
        Self::Hand,
        Self::Wrist,
        Self::HandTip,
        Self::Thumb,
        Self::Shoulder,
        Self::Elbow,
        Self::Head,
        Self::Spine,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Confidence of the body tracker in a joint position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TrackingState {
    NotTracked,
    /// Position was estimated from surrounding joints.
    Inferred,
    Tracked,
}

/// A camera-space joint position along with its tracking state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Joint {
    position: Point3<f32>,
    state: TrackingState,
}

impl Joint {
    pub fn new(position: Point3<f32>, state: TrackingState) -> Self {
        Self { position, state }
    }

    /// Creates a joint that the tracker did not find.
    pub fn not_tracked() -> Self {
        Self::new(Point3::origin(), TrackingState::NotTracked)
    }

    #[inline]
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    #[inline]
    pub fn state(&self) -> TrackingState {
        self.state
    }

    #[inline]
    pub fn is_tracked(&self) -> bool {
        self.state == TrackingState::Tracked
    }

    /// Returns the distance of the joint from the sensor plane in millimeters.
    ///
    /// Joints behind the sensor are clamped to `0`.
    pub fn depth_mm(&self) -> u16 {
        (self.position.z.max(0.0) * 1000.0).round().min(f32::from(u16::MAX)) as u16
    }
}

/// The set of tracked joints for one hand side.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSet {
    joints: [Joint; 8],
}

impl JointSet {
    /// Creates a joint set in which no joint is tracked.
    pub fn new() -> Self {
        Self {
            joints: [Joint::not_tracked(); 8],
        }
    }

    #[inline]
    pub fn get(&self, kind: JointKind) -> &Joint {
        &self.joints[kind.index()]
    }

    #[inline]
    pub fn set(&mut self, kind: JointKind, joint: Joint) {
        self.joints[kind.index()] = joint;
    }

    /// Sets a joint, builder-style.
    pub fn with(mut self, kind: JointKind, position: Point3<f32>, state: TrackingState) -> Self {
        self.set(kind, Joint::new(position, state));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointKind, &Joint)> {
        JointKind::ALL.into_iter().zip(&self.joints)
    }
}

impl Default for JointSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one of the user's hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("left") {
            Ok(Side::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Ok(Side::Right)
        } else {
            anyhow::bail!("invalid hand side '{s}' (expected 'left' or 'right')")
        }
    }
}

/// Projects camera-space positions into pixel coordinates of the depth frame.
///
/// The sensor driver usually provides this; any `Fn(Point3<f32>) -> Point2<f32>` closure can be
/// used as well.
pub trait CoordinateMapper: Send + Sync {
    /// Maps `point` to (sub-)pixel coordinates in the depth frame.
    ///
    /// The result may lie outside of the frame or be non-finite if the point cannot be seen.
    fn to_depth_space(&self, point: Point3<f32>) -> Point2<f32>;
}

impl<F> CoordinateMapper for F
where
    F: Fn(Point3<f32>) -> Point2<f32> + Send + Sync,
{
    fn to_depth_space(&self, point: Point3<f32>) -> Point2<f32> {
        self(point)
    }
}

/// An ideal pinhole camera model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeMapper {
    focal_x: f32,
    focal_y: f32,
    center_x: f32,
    center_y: f32,
}

impl PinholeMapper {
    /// Approximate intrinsics of the Kinect v2 depth camera at `512x424`.
    pub const KINECT_DEPTH: Self = Self {
        focal_x: 365.5,
        focal_y: 365.5,
        center_x: 256.0,
        center_y: 212.0,
    };

    pub fn new(focal_x: f32, focal_y: f32, center_x: f32, center_y: f32) -> Self {
        Self {
            focal_x,
            focal_y,
            center_x,
            center_y,
        }
    }
}

impl Default for PinholeMapper {
    fn default() -> Self {
        Self::KINECT_DEPTH
    }
}

impl CoordinateMapper for PinholeMapper {
    fn to_depth_space(&self, point: Point3<f32>) -> Point2<f32> {
        if point.z <= 0.0 {
            return Point2::new(f32::NAN, f32::NAN);
        }
        // Y points up in camera space, but down in the image.
        Point2::new(
            self.center_x + self.focal_x * point.x / point.z,
            self.center_y - self.focal_y * point.y / point.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_side_from_str() {
        assert_eq!("left".parse::<Side>().unwrap(), Side::Left);
        assert_eq!("Right".parse::<Side>().unwrap(), Side::Right);
        assert!("middle".parse::<Side>().is_err());
        assert_eq!(Side::Left.to_string(), "left");
    }

    #[test]
    fn test_depth_mm() {
        let joint = Joint::new(Point3::new(0.0, 0.0, 1.2346), TrackingState::Tracked);
        assert_eq!(joint.depth_mm(), 1235);
        let behind = Joint::new(Point3::new(0.0, 0.0, -1.0), TrackingState::Tracked);
        assert_eq!(behind.depth_mm(), 0);
    }

    #[test]
    fn test_joint_set() {
        let set = JointSet::new().with(
            JointKind::Elbow,
            Point3::new(1.0, 2.0, 3.0),
            TrackingState::Inferred,
        );
        assert_eq!(set.get(JointKind::Elbow).state(), TrackingState::Inferred);
        assert!(!set.get(JointKind::Hand).is_tracked());
        assert_eq!(set.iter().count(), 8);
        assert_eq!(
            set.iter().find(|(_, j)| j.state() != TrackingState::NotTracked).unwrap().0,
            JointKind::Elbow
        );
    }

    #[test]
    fn test_pinhole() {
        let mapper = PinholeMapper::default();
        let center = mapper.to_depth_space(Point3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(center, Point2::new(256.0, 212.0));
        let up_right = mapper.to_depth_space(Point3::new(0.5, 0.5, 1.0));
        assert!(up_right.x > 256.0 && up_right.y < 212.0);
        assert!(mapper.to_depth_space(Point3::new(0.0, 0.0, 0.0)).x.is_nan());

        let closure = |p: Point3<f32>| Point2::new(p.x, p.y);
        assert_eq!(closure.to_depth_space(Point3::new(1.0, 2.0, 3.0)), Point2::new(1.0, 2.0));
    }
}
