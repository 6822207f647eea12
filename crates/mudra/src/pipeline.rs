//! The per-frame recognition pipeline.

use std::{path::Path, sync::Arc};

use crate::{
    buffer::{FrameBuffer, FrameRecord, SideRecord},
    config::Config,
    gesture::{
        catalog, DynamicGestureDetector, DynamicGestureTemplate, DynamicOutcome, GestureMatcher,
        GestureTemplate,
    },
    hand::{HandAnalyzer, HandGeometry, HandRegion, HandSegmenter},
    image::{DepthFrame, DepthRange, Resolution},
    joint::{CoordinateMapper, JointSet, Side},
};

/// What was recognized for one hand side in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SideResult {
    region: Option<HandRegion>,
    geometry: Option<HandGeometry>,
    gesture: Option<String>,
    dynamic: DynamicOutcome,
}

impl SideResult {
    fn empty() -> Self {
        Self {
            region: None,
            geometry: None,
            gesture: None,
            dynamic: DynamicOutcome::InsufficientHistory,
        }
    }

    /// Returns the segmented hand, if one was found.
    pub fn region(&self) -> Option<&HandRegion> {
        self.region.as_ref()
    }

    pub fn geometry(&self) -> Option<&HandGeometry> {
        self.geometry.as_ref()
    }

    /// Returns the number of fingers found, or `None` if no palm was found.
    pub fn finger_count(&self) -> Option<u32> {
        self.geometry.as_ref().map(HandGeometry::finger_count)
    }

    /// Returns the name of the recognized static gesture.
    pub fn gesture(&self) -> Option<&str> {
        self.gesture.as_deref()
    }

    pub fn dynamic(&self) -> &DynamicOutcome {
        &self.dynamic
    }
}

/// Results of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    sides: [SideResult; 2],
}

impl FrameResult {
    pub fn side(&self, side: Side) -> &SideResult {
        &self.sides[side.index()]
    }
}

/// Runs segmentation, hand analysis, and static and dynamic gesture recognition on a stream of
/// depth frames.
///
/// Both hand sides are processed independently. Every processed frame is recorded in a shared
/// [`FrameBuffer`], which other threads may read through [`FrameProcessor::buffer`].
pub struct FrameProcessor {
    frame_resolution: Resolution,
    segmenter: HandSegmenter,
    analyzer: HandAnalyzer,
    matcher: GestureMatcher,
    detector: DynamicGestureDetector,
    buffer: Arc<FrameBuffer>,
}

impl FrameProcessor {
    /// Creates a frame processor without any registered gestures.
    ///
    /// # Panics
    ///
    /// Panics if the configured buffer capacity is 0.
    pub fn new(config: Config, mapper: Arc<dyn CoordinateMapper>) -> Self {
        Self {
            frame_resolution: config.frame_resolution,
            segmenter: HandSegmenter::new(config.segmenter, config.depth_range, mapper),
            analyzer: HandAnalyzer::new(config.geometry),
            matcher: GestureMatcher::new(config.thresholds),
            detector: DynamicGestureDetector::new(config.dynamic),
            buffer: Arc::new(FrameBuffer::new(config.buffer_capacity)),
        }
    }

    /// Returns the resolution of depth frames this processor accepts.
    pub fn frame_resolution(&self) -> Resolution {
        self.frame_resolution
    }

    pub fn segmenter(&self) -> &HandSegmenter {
        &self.segmenter
    }

    pub fn analyzer(&self) -> &HandAnalyzer {
        &self.analyzer
    }

    /// Returns a handle to the buffer of processed frames.
    pub fn buffer(&self) -> Arc<FrameBuffer> {
        self.buffer.clone()
    }

    pub fn matcher(&self) -> &GestureMatcher {
        &self.matcher
    }

    pub fn matcher_mut(&mut self) -> &mut GestureMatcher {
        &mut self.matcher
    }

    pub fn detector(&self) -> &DynamicGestureDetector {
        &self.detector
    }

    pub fn register_gesture(&mut self, template: GestureTemplate) {
        self.matcher.register(template);
    }

    pub fn register_dynamic_gesture(&mut self, template: DynamicGestureTemplate) {
        self.detector.register(template);
    }

    /// Registers the standard gesture catalog, loading the reference images from `dir`.
    pub fn register_standard_catalog<P: AsRef<Path>>(&mut self, dir: P) -> anyhow::Result<()> {
        let (gestures, dynamic) = catalog::standard(dir)?;
        for template in gestures {
            self.register_gesture(template);
        }
        for template in dynamic {
            self.register_dynamic_gesture(template);
        }
        Ok(())
    }

    /// Changes the band of depth values considered reliable, for example after the sensor was
    /// recalibrated.
    pub fn set_depth_range(&mut self, range: DepthRange) {
        self.segmenter.set_depth_range(range);
    }

    /// Processes one depth frame along with the joints of the left and right hand side.
    ///
    /// Frames that don't have the configured resolution are not processed or recorded.
    pub fn process(&mut self, frame: &DepthFrame, joints: &[JointSet; 2]) -> FrameResult {
        if frame.resolution() != self.frame_resolution {
            log::warn!(
                "ignoring {} depth frame (expected {})",
                frame.resolution(),
                self.frame_resolution
            );
            return FrameResult {
                sides: [SideResult::empty(), SideResult::empty()],
            };
        }

        let mut sides = Side::ALL.map(|side| {
            let joints = &joints[side.index()];
            let region = self.segmenter.segment(frame, joints);
            let geometry = region.as_ref().and_then(|r| self.analyzer.analyze(r));
            let gesture = match (&region, &geometry) {
                (Some(region), Some(geometry)) => self
                    .matcher
                    .match_region(region, geometry.finger_count())
                    .map(|m| m.name().to_string()),
                _ => None,
            };
            if let Some(geometry) = &geometry {
                log::trace!(
                    "{side} hand: {} fingers pointing {:?}, gesture {:?}",
                    geometry.finger_count(),
                    geometry.direction(),
                    gesture,
                );
            }
            SideResult {
                region,
                geometry,
                gesture,
                dynamic: DynamicOutcome::InsufficientHistory,
            }
        });

        let [left, right] = &sides;
        self.buffer.push(FrameRecord::new(
            frame.clone(),
            SideRecord::new(joints[0].clone(), left.region.clone(), left.gesture.clone()),
            SideRecord::new(joints[1].clone(), right.region.clone(), right.gesture.clone()),
        ));

        for side in Side::ALL {
            sides[side.index()].dynamic = self.detector.detect(side, &self.buffer);
        }

        FrameResult { sides }
    }
}
