//! Image processing primitives for depth-based hand analysis.
//!
//! This crate provides the low-level building blocks used by `mudra`: depth frames, binary masks,
//! moment-based shape matching, radial boundary histograms, and simple drawing routines for
//! visualization. Connected components, contour tracing and the Euclidean distance transform are
//! computed by [`imageproc`].
//!
//! # Coordinates
//!
//! Pixel coordinates have their origin in the top left corner of the frame or mask, with X
//! pointing right and Y pointing down.

mod contour;
mod depth;
mod distance;
pub mod draw;
mod histogram;
mod mask;
mod moments;
mod rect;
mod resolution;

pub use contour::*;
pub use depth::*;
pub use distance::*;
pub use draw::Color;
pub use histogram::*;
pub use mask::*;
pub use moments::*;
pub use rect::*;
pub use resolution::*;

pub use image::{GrayImage, Rgb, RgbImage};
