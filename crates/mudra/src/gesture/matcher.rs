use crate::{
    hand::HandRegion,
    image::{match_shapes, ShapeMatchMethod},
};

use super::{GestureTemplate, ShapeSignature};

/// Computes a dissimilarity score between two hand shapes from their outlines.
///
/// A score of 0 means the shapes are identical.
pub trait ContourComparator: Send + Sync {
    fn compare(&self, observed: &ShapeSignature, reference: &ShapeSignature) -> f64;
}

/// Computes a dissimilarity score between the radial boundary histograms of two hand shapes.
///
/// A score of 0 means the histograms are identical.
pub trait HistogramComparator: Send + Sync {
    fn compare(&self, observed: &ShapeSignature, reference: &ShapeSignature) -> f64;
}

/// Compares shapes by their Hu moment invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuMomentComparator {
    pub method: ShapeMatchMethod,
}

impl Default for HuMomentComparator {
    fn default() -> Self {
        Self {
            method: ShapeMatchMethod::I3,
        }
    }
}

impl ContourComparator for HuMomentComparator {
    fn compare(&self, observed: &ShapeSignature, reference: &ShapeSignature) -> f64 {
        match_shapes(observed.moments(), reference.moments(), self.method)
    }
}

/// Compares radial histograms by their Bhattacharyya distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BhattacharyyaComparator;

impl HistogramComparator for BhattacharyyaComparator {
    fn compare(&self, observed: &ShapeSignature, reference: &ShapeSignature) -> f64 {
        observed.histogram().compare(reference.histogram())
    }
}

/// Acceptance gates of the [`GestureMatcher`].
///
/// A match is only accepted if its rating, contour score and histogram score are all at or below
/// their threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    rating: f64,
    contour: f64,
    histogram: f64,
}

impl MatchThresholds {
    /// Maximum product of contour and histogram score.
    pub const DEFAULT_RATING: f64 = 0.0125;
    pub const DEFAULT_CONTOUR: f64 = 0.80;
    pub const DEFAULT_HISTOGRAM: f64 = 0.20;

    pub fn rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    pub fn contour(mut self, contour: f64) -> Self {
        self.contour = contour;
        self
    }

    pub fn histogram(mut self, histogram: f64) -> Self {
        self.histogram = histogram;
        self
    }

    fn accepts(&self, m: &GestureMatch<'_>) -> bool {
        m.rating <= self.rating
            && m.contour_score <= self.contour
            && m.histogram_score <= self.histogram
    }
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            rating: Self::DEFAULT_RATING,
            contour: Self::DEFAULT_CONTOUR,
            histogram: Self::DEFAULT_HISTOGRAM,
        }
    }
}

/// The template a hand region was recognized as.
#[derive(Debug, Clone, Copy)]
pub struct GestureMatch<'a> {
    template: &'a GestureTemplate,
    contour_score: f64,
    histogram_score: f64,
    rating: f64,
}

impl<'a> GestureMatch<'a> {
    pub fn template(&self) -> &'a GestureTemplate {
        self.template
    }

    pub fn name(&self) -> &'a str {
        self.template.name()
    }

    pub fn contour_score(&self) -> f64 {
        self.contour_score
    }

    pub fn histogram_score(&self) -> f64 {
        self.histogram_score
    }

    /// Returns the product of contour and histogram score. Lower is better.
    pub fn rating(&self) -> f64 {
        self.rating
    }
}

/// Recognizes static gestures by comparing hand regions against a catalog of templates.
pub struct GestureMatcher {
    templates: Vec<GestureTemplate>,
    thresholds: MatchThresholds,
    contour: Box<dyn ContourComparator>,
    histogram: Box<dyn HistogramComparator>,
}

impl GestureMatcher {
    /// Rating of the initial "no template" candidate. A template must rate strictly lower.
    const WORST_RATING: f64 = 999.0 * 999.0;

    /// Creates a matcher without any templates, using the Hu moment and Bhattacharyya
    /// comparators.
    pub fn new(thresholds: MatchThresholds) -> Self {
        Self {
            templates: Vec::new(),
            thresholds,
            contour: Box::new(HuMomentComparator::default()),
            histogram: Box::new(BhattacharyyaComparator),
        }
    }

    /// Adds a template to the catalog.
    ///
    /// When two templates rate equally well, the one registered first wins.
    pub fn register(&mut self, template: GestureTemplate) {
        log::debug!(
            "registered gesture '{}' ({} fingers)",
            template.name(),
            template.fingers()
        );
        self.templates.push(template);
    }

    pub fn templates(&self) -> &[GestureTemplate] {
        &self.templates
    }

    pub fn thresholds(&self) -> MatchThresholds {
        self.thresholds
    }

    pub fn set_thresholds(&mut self, thresholds: MatchThresholds) {
        self.thresholds = thresholds;
    }

    pub fn set_contour_comparator<C: ContourComparator + 'static>(&mut self, comparator: C) {
        self.contour = Box::new(comparator);
    }

    pub fn set_histogram_comparator<C: HistogramComparator + 'static>(&mut self, comparator: C) {
        self.histogram = Box::new(comparator);
    }

    /// Finds the template that best matches `region`, considering only templates that expect
    /// exactly `fingers` fingers.
    ///
    /// Returns `None` if no template passes the [`MatchThresholds`].
    pub fn match_region(&self, region: &HandRegion, fingers: u32) -> Option<GestureMatch<'_>> {
        let Some(observed) = ShapeSignature::of_mask(region.mask()) else {
            log::trace!("no match: empty hand region");
            return None;
        };

        let mut best: Option<GestureMatch<'_>> = None;
        for template in self.templates.iter().filter(|t| t.fingers() == fingers) {
            let contour_score = self.contour.compare(&observed, template.signature());
            let histogram_score = self.histogram.compare(&observed, template.signature());
            let rating = contour_score * histogram_score;
            log::trace!(
                "'{}': contour={:.4} histogram={:.4} rating={:.5}",
                template.name(),
                contour_score,
                histogram_score,
                rating,
            );

            let best_rating = best.map_or(Self::WORST_RATING, |b| b.rating);
            if rating < best_rating {
                best = Some(GestureMatch {
                    template,
                    contour_score,
                    histogram_score,
                    rating,
                });
            }
        }

        match best {
            Some(m) if self.thresholds.accepts(&m) => {
                log::debug!("recognized '{}' (rating {:.5})", m.name(), m.rating);
                Some(m)
            }
            Some(m) => {
                log::trace!(
                    "no match: best candidate '{}' failed the thresholds (rating {:.5})",
                    m.name(),
                    m.rating
                );
                None
            }
            None => {
                log::trace!("no match: no template with {} fingers", fingers);
                None
            }
        }
    }
}

impl Default for GestureMatcher {
    fn default() -> Self {
        Self::new(MatchThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::test::HandShape;

    struct Fixed(f64);

    impl ContourComparator for Fixed {
        fn compare(&self, _: &ShapeSignature, _: &ShapeSignature) -> f64 {
            self.0
        }
    }

    impl HistogramComparator for Fixed {
        fn compare(&self, _: &ShapeSignature, _: &ShapeSignature) -> f64 {
            self.0
        }
    }

    fn matcher() -> GestureMatcher {
        let mut matcher = GestureMatcher::default();
        matcher.register(GestureTemplate::new("Fist", HandShape::fist().mask(), 0).unwrap());
        matcher.register(GestureTemplate::new("Open", HandShape::open().mask(), 5).unwrap());
        matcher
    }

    #[test]
    fn test_identical_region() {
        let matcher = matcher();
        let m = matcher.match_region(&HandShape::open().region(), 5).unwrap();
        assert_eq!(m.name(), "Open");
        assert_relative_eq!(m.contour_score(), 0.0);
        // The Bhattacharyya coefficient of identical histograms sums to 1 only up to rounding.
        assert!(m.histogram_score() < 1e-6);
        assert!(m.rating() < 1e-9);

        let m = matcher.match_region(&HandShape::fist().region(), 0).unwrap();
        assert_eq!(m.name(), "Fist");
    }

    #[test]
    fn test_finger_count_must_match() {
        let matcher = matcher();
        assert!(matcher.match_region(&HandShape::open().region(), 4).is_none());
        assert!(matcher.match_region(&HandShape::open().region(), 0).is_none());
    }

    #[test]
    fn test_no_templates() {
        let matcher = GestureMatcher::default();
        assert!(matcher.match_region(&HandShape::open().region(), 5).is_none());
    }

    #[test]
    fn test_gates() {
        let region = HandShape::open().region();
        let mut matcher = matcher();

        // 0.5 * 0.02 = 0.01, all gates pass.
        matcher.set_contour_comparator(Fixed(0.5));
        matcher.set_histogram_comparator(Fixed(0.02));
        assert!(matcher.match_region(&region, 5).is_some());

        // Rating passes, contour score does not.
        matcher.set_contour_comparator(Fixed(0.9));
        matcher.set_histogram_comparator(Fixed(0.01));
        assert!(matcher.match_region(&region, 5).is_none());

        // Rating passes, histogram score does not.
        matcher.set_contour_comparator(Fixed(0.05));
        matcher.set_histogram_comparator(Fixed(0.21));
        assert!(matcher.match_region(&region, 5).is_none());

        // Both scores pass, rating does not.
        matcher.set_contour_comparator(Fixed(0.75));
        matcher.set_histogram_comparator(Fixed(0.19));
        assert!(matcher.match_region(&region, 5).is_none());

        matcher.set_thresholds(MatchThresholds::default().rating(0.2));
        assert!(matcher.match_region(&region, 5).is_some());
    }

    #[test]
    fn test_first_registered_wins_ties() {
        let mut matcher = matcher();
        matcher.register(GestureTemplate::new("Open again", HandShape::open().mask(), 5).unwrap());
        matcher.set_contour_comparator(Fixed(0.1));
        matcher.set_histogram_comparator(Fixed(0.1));
        let m = matcher.match_region(&HandShape::open().region(), 5).unwrap();
        assert_eq!(m.name(), "Open");
    }

    #[test]
    fn test_worst_rating_is_exclusive() {
        let mut matcher = matcher();
        matcher.set_contour_comparator(Fixed(999.0));
        matcher.set_histogram_comparator(Fixed(999.0));
        matcher.set_thresholds(
            MatchThresholds::default()
                .rating(f64::INFINITY)
                .contour(f64::INFINITY)
                .histogram(f64::INFINITY),
        );
        assert!(matcher.match_region(&HandShape::open().region(), 5).is_none());
    }
}
