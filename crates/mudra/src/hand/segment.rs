//! Depth-based hand segmentation.

use std::{collections::VecDeque, sync::Arc};

use nalgebra::Point2;

use crate::{
    image::{DepthFrame, DepthRange, Mask, Resolution},
    joint::{CoordinateMapper, JointKind, JointSet, TrackingState},
};

use super::HandRegion;

/// Tunable parameters of the [`HandSegmenter`].
#[derive(Debug, Clone, PartialEq)]
pub struct SegmenterOptions {
    forward_threshold: u16,
    backward_threshold: u16,
    body_cutoff: u16,
    hand_resolution: Resolution,
    border: u32,
}

impl SegmenterOptions {
    /// How far (in mm) pixels may lie in front of the hand joint to belong to the hand.
    pub const DEFAULT_FORWARD_THRESHOLD: u16 = 200;
    /// How far (in mm) pixels may lie behind the hand joint to belong to the hand.
    pub const DEFAULT_BACKWARD_THRESHOLD: u16 = 25;
    /// How far (in mm) the hand must be in front of the body for segmentation to be attempted.
    pub const DEFAULT_BODY_CUTOFF: u16 = 350;
    /// Empty margin (in pixels) around the hand in the normalized mask.
    pub const DEFAULT_BORDER: u32 = 10;

    /// Sets the forward depth threshold.
    ///
    /// By default, [`Self::DEFAULT_FORWARD_THRESHOLD`] is used.
    pub fn forward_threshold(mut self, mm: u16) -> Self {
        self.forward_threshold = mm;
        self
    }

    /// Sets the backward depth threshold.
    ///
    /// By default, [`Self::DEFAULT_BACKWARD_THRESHOLD`] is used.
    pub fn backward_threshold(mut self, mm: u16) -> Self {
        self.backward_threshold = mm;
        self
    }

    /// Sets the minimum distance between hand and body.
    ///
    /// By default, [`Self::DEFAULT_BODY_CUTOFF`] is used.
    pub fn body_cutoff(mut self, mm: u16) -> Self {
        self.body_cutoff = mm;
        self
    }

    /// Sets the resolution of the normalized hand mask.
    ///
    /// By default, [`Resolution::HAND`] is used.
    pub fn hand_resolution(mut self, resolution: Resolution) -> Self {
        self.hand_resolution = resolution;
        self
    }

    /// Sets the margin around the hand in the normalized mask.
    ///
    /// By default, [`Self::DEFAULT_BORDER`] is used.
    pub fn border(mut self, border: u32) -> Self {
        self.border = border;
        self
    }
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            forward_threshold: Self::DEFAULT_FORWARD_THRESHOLD,
            backward_threshold: Self::DEFAULT_BACKWARD_THRESHOLD,
            body_cutoff: Self::DEFAULT_BODY_CUTOFF,
            hand_resolution: Resolution::HAND,
            border: Self::DEFAULT_BORDER,
        }
    }
}

/// Joints that, besides the hand joint itself, must at least be inferred.
const REQUIRED_JOINTS: [JointKind; 3] = [JointKind::Wrist, JointKind::HandTip, JointKind::Thumb];

/// Joints used as the body reference depth, in order of preference.
const BODY_JOINTS: [JointKind; 3] = [JointKind::Shoulder, JointKind::Head, JointKind::Spine];

/// Cuts a hand out of a depth frame by growing a region from the hand joint.
///
/// The segmenter keeps its work buffers between frames, so it should be reused.
pub struct HandSegmenter {
    options: SegmenterOptions,
    depth_range: DepthRange,
    mapper: Arc<dyn CoordinateMapper>,
    region: Mask,
    queue: VecDeque<(u32, u32)>,
}

impl HandSegmenter {
    pub fn new(
        options: SegmenterOptions,
        depth_range: DepthRange,
        mapper: Arc<dyn CoordinateMapper>,
    ) -> Self {
        Self {
            options,
            depth_range,
            mapper,
            region: Mask::new(Resolution::new(0, 0)),
            queue: VecDeque::new(),
        }
    }

    pub fn options(&self) -> &SegmenterOptions {
        &self.options
    }

    /// Returns the resolution of the hand masks this segmenter produces.
    pub fn hand_resolution(&self) -> Resolution {
        self.options.hand_resolution
    }

    pub fn depth_range(&self) -> DepthRange {
        self.depth_range
    }

    /// Changes the band of depth values considered reliable.
    pub fn set_depth_range(&mut self, range: DepthRange) {
        log::debug!("segmenter depth range set to {range:?}");
        self.depth_range = range;
    }

    /// Returns the full-resolution region grown by the last call to [`HandSegmenter::segment`].
    ///
    /// The mask is empty if the last call did not get as far as growing a region.
    pub fn region_mask(&self) -> &Mask {
        &self.region
    }

    /// Segments the hand described by `joints` out of `frame`.
    ///
    /// Returns `None` if the joints are not tracked well enough, the hand is too close to the body,
    /// or the grown region is degenerate.
    pub fn segment(&mut self, frame: &DepthFrame, joints: &JointSet) -> Option<HandRegion> {
        if self.region.resolution() != frame.resolution() {
            self.region = Mask::new(frame.resolution());
        } else {
            self.region.clear();
        }

        let hand = joints.get(JointKind::Hand);
        if !hand.is_tracked() {
            log::trace!("hand joint not tracked");
            return None;
        }
        if let Some(kind) = REQUIRED_JOINTS
            .into_iter()
            .find(|kind| joints.get(*kind).state() == TrackingState::NotTracked)
        {
            log::trace!("{kind:?} joint not tracked");
            return None;
        }

        let hand_depth = hand.depth_mm();
        let body_depth = BODY_JOINTS
            .into_iter()
            .map(|kind| joints.get(kind))
            .find(|joint| joint.is_tracked())
            .map_or(0, |joint| joint.depth_mm());
        if i32::from(body_depth) - i32::from(hand_depth) < i32::from(self.options.body_cutoff) {
            log::trace!("hand at {hand_depth} mm too close to body at {body_depth} mm");
            return None;
        }

        let seed = self.mapper.to_depth_space(hand.position());
        let (sx, sy) = (seed.x.round(), seed.y.round());
        if !sx.is_finite()
            || !sy.is_finite()
            || !frame.resolution().contains(sx as i32, sy as i32)
        {
            log::trace!("hand joint projects to {seed:?}, outside of the depth frame");
            return None;
        }

        let near = i32::from(hand_depth) - i32::from(self.options.forward_threshold);
        let far = i32::from(hand_depth) + i32::from(self.options.backward_threshold);
        let range = self.depth_range;
        let admit = |depth: u16| range.contains(depth) && (near..=far).contains(&i32::from(depth));

        let (sx, sy) = (sx as u32, sy as u32);
        if !admit(frame.get(sx, sy)) {
            log::trace!(
                "seed pixel ({sx},{sy}) at {} mm rejected (hand at {hand_depth} mm)",
                frame.get(sx, sy)
            );
            return None;
        }

        // 4-connected flood fill; `region` doubles as the visited set.
        self.queue.clear();
        self.region.set(sx, sy, true);
        self.queue.push_back((sx, sy));
        while let Some((x, y)) = self.queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if !frame.resolution().contains(nx, ny) {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                if !self.region.get(nx, ny) && admit(frame.get(nx, ny)) {
                    self.region.set(nx, ny, true);
                    self.queue.push_back((nx, ny));
                }
            }
        }

        let rect = self.region.bounding_rect()?;
        if rect.width() < 2 || rect.height() < 2 {
            log::trace!("degenerate hand region {rect:?}");
            return None;
        }

        let (mask, transform) =
            self.region
                .crop_fit(rect, self.options.hand_resolution, self.options.border);

        let mut region = HandRegion::new(mask, rect);
        for (kind, joint) in joints.iter() {
            if joint.state() == TrackingState::NotTracked {
                continue;
            }
            let p = self.mapper.to_depth_space(joint.position());
            if p.x.is_finite() && p.y.is_finite() {
                let (mx, my) = transform.apply(p.x, p.y);
                region = region.with_joint(kind, Point2::new(mx, my));
            }
        }

        Some(region)
    }
}
