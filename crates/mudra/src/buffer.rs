//! Sliding window of recent frame results.

use std::{
    collections::VecDeque,
    sync::{Arc, PoisonError, RwLock},
};

use nalgebra::Vector2;

use crate::{
    hand::HandRegion,
    image::DepthFrame,
    joint::{JointKind, JointSet, Side, TrackingState},
};

/// What was found for one hand side in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SideRecord {
    joints: JointSet,
    region: Option<HandRegion>,
    gesture: Option<String>,
}

impl SideRecord {
    pub fn new(joints: JointSet, region: Option<HandRegion>, gesture: Option<String>) -> Self {
        Self {
            joints,
            region,
            gesture,
        }
    }

    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    pub fn region(&self) -> Option<&HandRegion> {
        self.region.as_ref()
    }

    /// Returns the name of the static gesture recognized on this side, if any.
    pub fn gesture(&self) -> Option<&str> {
        self.gesture.as_deref()
    }

    /// Computes the offset from the hand joint to the elbow joint, in camera space.
    ///
    /// A negative Y component means the hand is above the elbow. Returns a zero vector if either
    /// joint is not tracked.
    pub fn hand_elbow_offset(&self) -> Vector2<f32> {
        let hand = self.joints.get(JointKind::Hand);
        let elbow = self.joints.get(JointKind::Elbow);
        if hand.state() == TrackingState::NotTracked || elbow.state() == TrackingState::NotTracked
        {
            return Vector2::zeros();
        }
        (elbow.position() - hand.position()).xy()
    }
}

/// Everything recorded about a single processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    depth: DepthFrame,
    sides: [SideRecord; 2],
}

impl FrameRecord {
    /// Creates a frame record from the depth frame and the left and right side results.
    pub fn new(depth: DepthFrame, left: SideRecord, right: SideRecord) -> Self {
        Self {
            depth,
            sides: [left, right],
        }
    }

    pub fn depth(&self) -> &DepthFrame {
        &self.depth
    }

    pub fn side(&self, side: Side) -> &SideRecord {
        &self.sides[side.index()]
    }
}

/// Per-frame features of one hand side, used for dynamic gesture detection.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFeatures {
    /// The recognized static gesture, if any.
    pub gesture: Option<String>,
    /// See [`SideRecord::hand_elbow_offset`].
    pub offset: Vector2<f32>,
}

/// A bounded FIFO of the most recent [`FrameRecord`]s.
///
/// The buffer is shared between the thread that processes frames and any number of readers.
/// Pushing a record into a full buffer evicts the oldest one.
#[derive(Debug)]
pub struct FrameBuffer {
    capacity: usize,
    records: RwLock<VecDeque<Arc<FrameRecord>>>,
}

impl FrameBuffer {
    /// The default number of frames kept: a little over one second of Kinect frames.
    pub const DEFAULT_CAPACITY: usize = 35;

    /// Creates an empty buffer holding up to `capacity` records.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "frame buffer capacity must be non-zero");
        Self {
            capacity,
            records: RwLock::new(VecDeque::with_capacity(capacity + 1)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a record, evicting the oldest record if the buffer is full.
    pub fn push(&self, record: FrameRecord) {
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.push_back(Arc::new(record));
        while records.len() > self.capacity {
            records.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn oldest(&self) -> Option<Arc<FrameRecord>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .front()
            .cloned()
    }

    pub fn latest(&self) -> Option<Arc<FrameRecord>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .back()
            .cloned()
    }

    /// Returns a snapshot of all records, oldest first.
    pub fn records(&self) -> Vec<Arc<FrameRecord>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Extracts the features of `side` from every buffered frame, oldest first.
    pub fn features(&self, side: Side) -> Vec<FrameFeatures> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|record| {
                let side = record.side(side);
                FrameFeatures {
                    gesture: side.gesture.clone(),
                    offset: side.hand_elbow_offset(),
                }
            })
            .collect()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
