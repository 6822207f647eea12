//! Connected components and boundary tracing.

use image::Luma;
use imageproc::{
    contours::{find_contours, BorderType},
    region_labelling::connected_components,
};
use itertools::Itertools;

pub use imageproc::region_labelling::Connectivity;

use crate::Mask;

/// Splits the set pixels of `mask` into connected components.
///
/// Components are ordered by their first pixel in raster order, and the pixels of each component
/// are listed row by row.
pub fn components(mask: &Mask, connectivity: Connectivity) -> Vec<Vec<(u32, u32)>> {
    let labels = connected_components(&mask.to_luma(), connectivity, Luma([0u8]));

    // Labels are not guaranteed to be assigned in raster order, so order by first occurrence.
    let mut slots: Vec<Option<usize>> = Vec::new();
    let mut components: Vec<Vec<(u32, u32)>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0] as usize;
        if label == 0 {
            continue;
        }
        if slots.len() <= label {
            slots.resize(label + 1, None);
        }
        let slot = *slots[label].get_or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push((x, y));
    }
    components
}

/// Extracts the largest 8-connected component of `mask`.
///
/// If several components share the largest size, the one containing the first pixel in raster
/// order wins. Returns an empty mask if `mask` is empty.
pub fn largest_component(mask: &Mask) -> Mask {
    let components = components(mask, Connectivity::Eight);
    // `position_max_by_key` returns the last maximum, so search from the back.
    let largest = components
        .iter()
        .rev()
        .position_max_by_key(|c| c.len())
        .map(|i| components.len() - 1 - i);

    let mut out = Mask::new(mask.resolution());
    if let Some(largest) = largest {
        for &(x, y) in &components[largest] {
            out.set(x, y, true);
        }
    }
    out
}

/// The outer boundary of a region, as an ordered, closed list of pixel coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<(i32, i32)>,
}

impl Contour {
    /// Traces the outer boundary of the largest 8-connected component of `mask`.
    ///
    /// Tracing starts at the component's first pixel in raster order. Pixels on one-pixel-wide
    /// parts of the region may appear more than once.
    ///
    /// Returns `None` if `mask` is empty.
    pub fn trace(mask: &Mask) -> Option<Self> {
        let component = largest_component(mask);
        if component.is_empty() {
            return None;
        }

        // Borders touching the image edge are only found with a background margin around them.
        let padded = component.to_padded_luma(1);
        let contour = find_contours::<i32>(&padded)
            .into_iter()
            .find(|c| matches!(c.border_type, BorderType::Outer))?;
        let points = contour
            .points
            .iter()
            .map(|p| (p.x - 1, p.y - 1))
            .collect::<Vec<_>>();
        log::trace!("traced contour of {} points", points.len());

        Some(Self { points })
    }

    /// Returns the boundary pixels in tracing order.
    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
