//! Hand gesture recognition for depth cameras.
//!
//! Mudra takes depth frames and skeletal joint estimates (as produced by a body tracker such as
//! the one in the Kinect v2 SDK) and recognizes the hand shape and movement of each hand.
//!
//! Each frame passes through these stages, in order:
//!
//! 1. The [`HandSegmenter`] cuts the hand out of the depth frame and normalizes it to a fixed-size
//!    [`HandRegion`].
//! 2. The [`HandAnalyzer`] finds the palm and counts the fingers.
//! 3. The [`GestureMatcher`] compares the hand shape against a catalog of static gestures.
//! 4. The result is recorded in a [`FrameBuffer`], and the [`DynamicGestureDetector`] looks for
//!    waving and alternating gestures in the recorded history.
//!
//! [`FrameProcessor`] runs all of these for both hands.
//!
//! # Coordinates
//!
//! Joint positions are in camera space, in meters: X points to the right, Y points up, Z points
//! from the sensor into the scene. Pixel coordinates in depth frames and masks have X pointing
//! right and Y pointing *down*.
//!
//! [`HandSegmenter`]: hand::HandSegmenter
//! [`HandRegion`]: hand::HandRegion
//! [`HandAnalyzer`]: hand::HandAnalyzer
//! [`GestureMatcher`]: gesture::GestureMatcher
//! [`FrameBuffer`]: buffer::FrameBuffer
//! [`DynamicGestureDetector`]: gesture::DynamicGestureDetector
//! [`FrameProcessor`]: pipeline::FrameProcessor

use log::LevelFilter;

pub use mudra_image as image;

pub mod buffer;
pub mod config;
pub mod gesture;
pub mod hand;
pub mod joint;
pub mod pipeline;


/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .filter(Some("mudra_image"), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and Mudra will log at *debug* level. This can be overridden with the
/// `RUST_LOG` environment variable, for example to see why a frame yielded no gesture
/// (`RUST_LOG=mudra=trace`).
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
