use std::fmt;

use itertools::Itertools;

use crate::{
    buffer::{FrameBuffer, FrameFeatures},
    joint::Side,
};

use super::{DynamicGestureTemplate, DynamicKind};

/// Frequency and movement cutoffs of the [`DynamicGestureDetector`].
///
/// Frequencies are fractions of the number of buffered frames, and all cutoffs are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DynamicOptions {
    wave_gesture: f32,
    wave_raised: f32,
    wave_swing: f32,
    alternation: f32,
}

impl DynamicOptions {
    /// Fraction of frames that must show the waved gesture.
    pub const DEFAULT_WAVE_GESTURE: f32 = 0.4;
    /// Fraction of frames in which the hand must be above the elbow.
    pub const DEFAULT_WAVE_RAISED: f32 = 0.9;
    /// Sideways swing of the hand relative to the elbow, in meters.
    pub const DEFAULT_WAVE_SWING: f32 = 0.12;
    /// Fraction of frames that must show each of the alternated gestures.
    pub const DEFAULT_ALTERNATION: f32 = 0.3;

    pub fn wave_gesture(mut self, fraction: f32) -> Self {
        self.wave_gesture = fraction;
        self
    }

    pub fn wave_raised(mut self, fraction: f32) -> Self {
        self.wave_raised = fraction;
        self
    }

    pub fn wave_swing(mut self, meters: f32) -> Self {
        self.wave_swing = meters;
        self
    }

    pub fn alternation(mut self, fraction: f32) -> Self {
        self.alternation = fraction;
        self
    }
}

impl Default for DynamicOptions {
    fn default() -> Self {
        Self {
            wave_gesture: Self::DEFAULT_WAVE_GESTURE,
            wave_raised: Self::DEFAULT_WAVE_RAISED,
            wave_swing: Self::DEFAULT_WAVE_SWING,
            alternation: Self::DEFAULT_ALTERNATION,
        }
    }
}

/// A dynamic gesture found in the frame history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicDetection {
    name: String,
    side: Side,
}

impl DynamicDetection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the hand side that performed the gesture.
    pub fn side(&self) -> Side {
        self.side
    }
}

impl fmt::Display for DynamicDetection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} hand)", self.name, self.side)
    }
}

/// Result of [`DynamicGestureDetector::detect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DynamicOutcome {
    /// The buffer holds fewer than half of its capacity in frames.
    InsufficientHistory,
    /// No registered dynamic gesture was found.
    NoMatch,
    Detected(DynamicDetection),
}

impl DynamicOutcome {
    pub fn detection(&self) -> Option<&DynamicDetection> {
        match self {
            DynamicOutcome::Detected(detection) => Some(detection),
            _ => None,
        }
    }
}

/// Detects dynamic gestures in the recent history of a [`FrameBuffer`].
pub struct DynamicGestureDetector {
    options: DynamicOptions,
    templates: Vec<DynamicGestureTemplate>,
}

impl DynamicGestureDetector {
    pub fn new(options: DynamicOptions) -> Self {
        Self {
            options,
            templates: Vec::new(),
        }
    }

    /// Adds a dynamic gesture. Templates are tested in registration order.
    pub fn register(&mut self, template: DynamicGestureTemplate) {
        log::debug!(
            "registered dynamic gesture '{}' ({:?} of {:?})",
            template.name(),
            template.kind(),
            template.gestures(),
        );
        self.templates.push(template);
    }

    pub fn templates(&self) -> &[DynamicGestureTemplate] {
        &self.templates
    }

    pub fn options(&self) -> &DynamicOptions {
        &self.options
    }

    /// Looks for a dynamic gesture performed by the `side` hand in the frames of `buffer`.
    ///
    /// The first registered template whose conditions hold is returned.
    pub fn detect(&self, side: Side, buffer: &FrameBuffer) -> DynamicOutcome {
        let features = buffer.features(side);
        let required = buffer.capacity() / 2;
        if features.len() < required {
            log::trace!(
                "{side} hand: {} of {required} frames needed for dynamic gestures",
                features.len()
            );
            return DynamicOutcome::InsufficientHistory;
        }

        for template in &self.templates {
            let found = match template.kind() {
                DynamicKind::Wave => self.is_wave(template, &features),
                DynamicKind::Alternation => self.is_alternation(template, &features),
            };
            if found {
                log::debug!("{side} hand: detected '{}'", template.name());
                return DynamicOutcome::Detected(DynamicDetection {
                    name: template.name().to_string(),
                    side,
                });
            }
        }

        log::trace!("{side} hand: no dynamic gesture");
        DynamicOutcome::NoMatch
    }

    fn is_wave(&self, template: &DynamicGestureTemplate, features: &[FrameFeatures]) -> bool {
        let window = features.len() as f32;
        let gesture = &template.gestures()[0];

        let shown = features
            .iter()
            .filter(|f| f.gesture.as_ref() == Some(gesture))
            .count();
        let raised = features.iter().filter(|f| f.offset.y < 0.0).count();
        let swing = match features.iter().map(|f| f.offset.x).minmax().into_option() {
            Some((min, max)) => max - min,
            None => 0.0,
        };

        log::trace!(
            "'{}': {shown} frames showing '{gesture}', {raised} raised, swing {swing:.3}",
            template.name(),
        );
        shown as f32 > window * self.options.wave_gesture
            && raised as f32 > window * self.options.wave_raised
            && swing > self.options.wave_swing
    }

    fn is_alternation(
        &self,
        template: &DynamicGestureTemplate,
        features: &[FrameFeatures],
    ) -> bool {
        let window = features.len() as f32;
        let (first, second) = (&template.gestures()[0], &template.gestures()[1]);

        let (mut count_first, mut count_second) = (0, 0);
        for gesture in features.iter().filter_map(|f| f.gesture.as_ref()) {
            if gesture == first {
                count_first += 1;
            } else if gesture == second {
                count_second += 1;
            }
        }

        log::trace!(
            "'{}': {count_first} frames showing '{first}', {count_second} showing '{second}'",
            template.name(),
        );
        let cutoff = window * self.options.alternation;
        count_first as f32 > cutoff && count_second as f32 > cutoff
    }
}

impl Default for DynamicGestureDetector {
    fn default() -> Self {
        Self::new(DynamicOptions::default())
    }
}
