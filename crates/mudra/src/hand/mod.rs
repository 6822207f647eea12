//! Hand segmentation and geometry.
//!
//! A hand is first cut out of the depth frame by the [`HandSegmenter`], which produces a
//! [`HandRegion`]: a binary mask scaled to a fixed resolution so that later stages do not depend
//! on the distance of the hand from the sensor. The [`HandAnalyzer`] then locates the palm and
//! fingers in that mask.

use nalgebra::Point2;

use crate::{
    image::{draw, Color, Mask, Rect, RgbImage},
    joint::JointKind,
};

mod finger;
mod geometry;
mod segment;

pub use finger::*;
pub use geometry::*;
pub use segment::*;

/// A segmented hand, normalized to a fixed mask resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct HandRegion {
    mask: Mask,
    frame_rect: Rect,
    joints: [Option<Point2<f32>>; 8],
}

impl HandRegion {
    /// Creates a hand region from an already normalized mask.
    ///
    /// `frame_rect` is the area of the source frame the mask was cut from. Joint positions can be
    /// added with [`HandRegion::with_joint`].
    pub fn new(mask: Mask, frame_rect: Rect) -> Self {
        Self {
            mask,
            frame_rect,
            joints: [None; 8],
        }
    }

    /// Attaches the position of a joint, in mask coordinates.
    pub fn with_joint(mut self, kind: JointKind, position: Point2<f32>) -> Self {
        self.joints[kind.index()] = Some(position);
        self
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Returns the rectangle in the depth frame that this region was cropped from.
    #[inline]
    pub fn frame_rect(&self) -> Rect {
        self.frame_rect
    }

    /// Returns the position of a joint in mask coordinates, if it was tracked.
    ///
    /// The position may lie outside of the mask.
    #[inline]
    pub fn joint(&self, kind: JointKind) -> Option<Point2<f32>> {
        self.joints[kind.index()]
    }

    /// Renders the mask and, if available, the hand geometry found in it.
    ///
    /// The palm center is drawn red, the inner circle orange and the outer circle yellow. Fingers
    /// are drawn as dark cyan lines from base to tip with cyan tips. Tips that were discarded for
    /// being too close to the wrist are drawn purple, and the wrist itself pink.
    pub fn overlay(&self, geometry: Option<&HandGeometry>) -> RgbImage {
        let mut image = RgbImage::from_fn(self.mask.width(), self.mask.height(), |x, y| {
            if self.mask.get(x, y) {
                Color::WHITE.into()
            } else {
                Color::BLACK.into()
            }
        });

        if let Some(wrist) = self.joint(JointKind::Wrist) {
            draw::marker(&mut image, wrist.x.round() as i32, wrist.y.round() as i32)
                .color(Color::PINK);
        }

        let Some(geometry) = geometry else {
            return image;
        };

        let palm = geometry.palm();
        let (cx, cy) = (palm.center().x, palm.center().y);
        draw::circle(&mut image, cx, cy, palm.inner_radius() * 2 + 1).color(Color::ORANGE);
        draw::circle(&mut image, cx, cy, (palm.outer_radius() * 2.0).round() as u32 + 1)
            .color(Color::YELLOW);
        draw::marker(&mut image, cx, cy).size(3).color(Color::RED);

        for finger in geometry.implied_fingers() {
            let (tx, ty) = (finger.tip.x.round() as i32, finger.tip.y.round() as i32);
            draw::line(
                &mut image,
                finger.base.x.round() as i32,
                finger.base.y.round() as i32,
                tx,
                ty,
            )
            .color(Color::DARK_CYAN)
            .stroke_width(3);
            draw::circle(&mut image, tx, ty, 9)
                .color(Color::CYAN)
                .stroke_width(3);
        }
        for tip in geometry.rejected_tips() {
            draw::circle(&mut image, tip.x.round() as i32, tip.y.round() as i32, 9)
                .color(Color::PURPLE)
                .stroke_width(3);
        }

        image
    }
}
