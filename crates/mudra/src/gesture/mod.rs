//! Static and dynamic gesture recognition.
//!
//! A *static* gesture is a hand shape that can be recognized in a single frame, by comparing the
//! segmented hand against a catalog of [`GestureTemplate`]s with the [`GestureMatcher`].
//!
//! A *dynamic* gesture is a pattern of static gestures and hand movements over a window of recent
//! frames, described by a [`DynamicGestureTemplate`] and found by the [`DynamicGestureDetector`].

use std::{fmt, path::Path};

use crate::image::{Contour, Mask, Moments, RadialHistogram};

pub mod catalog;
mod dynamic;
mod matcher;

pub use dynamic::*;
pub use matcher::*;

/// Shape descriptors of a hand mask, as consumed by the comparators of a [`GestureMatcher`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSignature {
    moments: Moments,
    contour: Contour,
    histogram: RadialHistogram,
}

impl ShapeSignature {
    /// Computes the signature of the largest connected region in `mask`.
    ///
    /// Returns `None` if `mask` is empty.
    pub fn of_mask(mask: &Mask) -> Option<Self> {
        let component = crate::image::largest_component(mask);
        let moments = Moments::of_mask(&component);
        let contour = Contour::trace(&component)?;
        let histogram = RadialHistogram::new(&contour, &moments)?;
        Some(Self {
            moments,
            contour,
            histogram,
        })
    }

    pub fn moments(&self) -> &Moments {
        &self.moments
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    pub fn histogram(&self) -> &RadialHistogram {
        &self.histogram
    }
}

/// A named reference hand shape with its expected number of fingers.
#[derive(Clone)]
pub struct GestureTemplate {
    name: String,
    mask: Mask,
    fingers: u32,
    signature: ShapeSignature,
}

impl GestureTemplate {
    /// Creates a gesture template from a reference mask.
    ///
    /// Returns an error if `mask` is empty.
    pub fn new(name: impl Into<String>, mask: Mask, fingers: u32) -> anyhow::Result<Self> {
        let name = name.into();
        let Some(signature) = ShapeSignature::of_mask(&mask) else {
            anyhow::bail!("reference mask of gesture '{name}' is empty");
        };
        Ok(Self {
            name,
            mask,
            fingers,
            signature,
        })
    }

    /// Loads the reference mask of a gesture template from an image file.
    pub fn load<P: AsRef<Path>>(
        name: impl Into<String>,
        path: P,
        fingers: u32,
    ) -> anyhow::Result<Self> {
        let mask = Mask::load(path)?;
        Self::new(name, mask, fingers)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Returns the number of fingers a hand must show to match this template.
    pub fn fingers(&self) -> u32 {
        self.fingers
    }

    pub fn signature(&self) -> &ShapeSignature {
        &self.signature
    }
}

impl fmt::Debug for GestureTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureTemplate")
            .field("name", &self.name)
            .field("fingers", &self.fingers)
            .field("mask", &self.mask)
            .finish_non_exhaustive()
    }
}

/// The kinds of temporal pattern a [`DynamicGestureTemplate`] can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicKind {
    /// The hand shows one gesture while raised and swinging sideways.
    Wave,
    /// The hand alternates between two gestures.
    Alternation,
}

impl DynamicKind {
    /// Returns how many static gestures a template of this kind references.
    pub fn arity(self) -> usize {
        match self {
            DynamicKind::Wave => 1,
            DynamicKind::Alternation => 2,
        }
    }
}

/// A named dynamic gesture, referencing static gestures by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicGestureTemplate {
    name: String,
    kind: DynamicKind,
    gestures: Vec<String>,
}

impl DynamicGestureTemplate {
    /// Creates a dynamic gesture template.
    ///
    /// Returns an error if the number of referenced `gestures` does not match the `kind`.
    pub fn new<I, S>(
        name: impl Into<String>,
        kind: DynamicKind,
        gestures: I,
    ) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let gestures = gestures.into_iter().map(Into::into).collect::<Vec<_>>();
        if gestures.len() != kind.arity() {
            anyhow::bail!(
                "dynamic gesture '{name}' of kind {kind:?} needs {} static gesture(s), got {}",
                kind.arity(),
                gestures.len()
            );
        }
        Ok(Self {
            name,
            kind,
            gestures,
        })
    }

    /// Creates a template for waving while showing `gesture`.
    pub fn wave(name: impl Into<String>, gesture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: DynamicKind::Wave,
            gestures: vec![gesture.into()],
        }
    }

    /// Creates a template for alternating between `first` and `second`.
    pub fn alternation(
        name: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: DynamicKind::Alternation,
            gestures: vec![first.into(), second.into()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> DynamicKind {
        self.kind
    }

    /// Returns the names of the referenced static gestures.
    pub fn gestures(&self) -> &[String] {
        &self.gestures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Resolution;

    #[test]
    fn test_dynamic_arity() {
        assert!(DynamicGestureTemplate::new("Hello!", DynamicKind::Wave, ["Open hand"]).is_ok());
        assert!(
            DynamicGestureTemplate::new("Hello!", DynamicKind::Wave, ["Open hand", "Fist"])
                .is_err()
        );
        assert!(DynamicGestureTemplate::new(
            "Flash",
            DynamicKind::Alternation,
            Vec::<String>::new()
        )
        .is_err());

        let template =
            DynamicGestureTemplate::new("Flash", DynamicKind::Alternation, ["Open hand", "Fist"])
                .unwrap();
        assert_eq!(
            template,
            DynamicGestureTemplate::alternation("Flash", "Open hand", "Fist")
        );
        assert_eq!(template.gestures(), ["Open hand", "Fist"]);
    }

    #[test]
    fn test_empty_template() {
        let err = GestureTemplate::new("Nothing", Mask::new(Resolution::HAND), 0).unwrap_err();
        assert!(err.to_string().contains("Nothing"));
    }

    #[test]
    fn test_signature_uses_largest_component() {
        let with_speck = Mask::from_fn(Resolution::new(40, 40), |x, y| {
            ((10..30).contains(&x) && (10..30).contains(&y)) || (x == 2 && y == 2)
        });
        let clean = Mask::from_fn(Resolution::new(40, 40), |x, y| {
            (10..30).contains(&x) && (10..30).contains(&y)
        });
        assert_eq!(
            ShapeSignature::of_mask(&with_speck),
            ShapeSignature::of_mask(&clean)
        );
    }
}
