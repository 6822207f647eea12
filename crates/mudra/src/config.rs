//! Configuration of the whole recognition pipeline.

use crate::{
    buffer::FrameBuffer,
    gesture::{DynamicOptions, MatchThresholds},
    hand::{GeometryOptions, SegmenterOptions},
    image::{DepthRange, Resolution},
};

/// Settings of a [`FrameProcessor`][crate::pipeline::FrameProcessor].
///
/// The defaults are tuned for a Kinect v2 sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub(crate) frame_resolution: Resolution,
    pub(crate) depth_range: DepthRange,
    pub(crate) buffer_capacity: usize,
    pub(crate) segmenter: SegmenterOptions,
    pub(crate) geometry: GeometryOptions,
    pub(crate) thresholds: MatchThresholds,
    pub(crate) dynamic: DynamicOptions,
}

impl Config {
    pub const DEFAULT_FRAME_RESOLUTION: Resolution = Resolution::KINECT_DEPTH;

    /// Sets the resolution of incoming depth frames. Frames of any other size are ignored.
    pub fn frame_resolution(mut self, resolution: Resolution) -> Self {
        self.frame_resolution = resolution;
        self
    }

    /// Sets the band of depth values the sensor reports reliably.
    pub fn depth_range(mut self, range: DepthRange) -> Self {
        self.depth_range = range;
        self
    }

    /// Sets the number of frames kept for dynamic gesture detection.
    ///
    /// # Panics
    ///
    /// Creating a [`FrameProcessor`][crate::pipeline::FrameProcessor] panics if this is 0.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn segmenter(mut self, options: SegmenterOptions) -> Self {
        self.segmenter = options;
        self
    }

    pub fn geometry(mut self, options: GeometryOptions) -> Self {
        self.geometry = options;
        self
    }

    pub fn thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn dynamic(mut self, options: DynamicOptions) -> Self {
        self.dynamic = options;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_resolution: Self::DEFAULT_FRAME_RESOLUTION,
            depth_range: DepthRange::default(),
            buffer_capacity: FrameBuffer::DEFAULT_CAPACITY,
            segmenter: SegmenterOptions::default(),
            geometry: GeometryOptions::default(),
            thresholds: MatchThresholds::default(),
            dynamic: DynamicOptions::default(),
        }
    }
}
