//! Nearest-template shape classification in log-Hu space.

use hutree_image::BinaryMask;
use tracing::{debug, instrument};

use crate::feature::{FeatureVector, extract_features};
use crate::raster::ShapeKind;

/// Canvas size used for the reference shapes.
pub const DEFAULT_RESOLUTION: usize = 200;

/// One reference signature.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Template {
    /// Shape the signature was computed from.
    pub kind: ShapeKind,
    /// Log-Hu features of the canonical mask.
    pub features: FeatureVector,
}

/// Result of [`TemplateMatcher::classify`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct TemplateMatch {
    /// Closest template.
    pub label: ShapeKind,
    /// Euclidean distance to that template.
    pub distance: f64,
}

/// Classifies masks by the closest canonical shape signature.
///
/// Templates are computed once at construction, in [`ShapeKind::ALL`] order.
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    templates: Vec<Template>,
}

impl TemplateMatcher {
    /// Matcher with templates rendered on a 200 x 200 canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::with_resolution(DEFAULT_RESOLUTION)
    }

    /// Matcher with templates rendered on an `n x n` canvas.
    #[must_use]
    #[instrument(skip_all, fields(resolution = n))]
    pub fn with_resolution(n: usize) -> Self {
        let templates = ShapeKind::ALL
            .into_iter()
            .map(|kind| Template {
                kind,
                features: extract_features(&kind.canonical_mask(n)),
            })
            .collect();
        debug!("built shape templates");
        Self { templates }
    }

    /// Stored templates.
    #[must_use]
    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Nearest template to the features of `mask`.
    #[must_use]
    pub fn classify(&self, mask: &BinaryMask) -> TemplateMatch {
        self.classify_features(&extract_features(mask))
    }

    /// Nearest template to precomputed features. The earlier template wins exact ties.
    #[must_use]
    pub fn classify_features(&self, features: &FeatureVector) -> TemplateMatch {
        let mut best = TemplateMatch {
            label: ShapeKind::Circle,
            distance: f64::INFINITY,
        };
        for template in &self.templates {
            let distance = features.distance(&template.features);
            if distance < best.distance {
                best = TemplateMatch {
                    label: template.kind,
                    distance,
                };
            }
        }
        best
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{circle_mask, rectangle_mask, square_mask, triangle_mask};

    #[test]
    fn templates_in_fixed_order() {
        let matcher = TemplateMatcher::new();
        let kinds: Vec<_> = matcher.templates().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, ShapeKind::ALL.to_vec());
    }

    #[test]
    fn canonical_shapes_match_themselves() {
        let matcher = TemplateMatcher::new();
        for kind in ShapeKind::ALL {
            let m = matcher.classify(&kind.canonical_mask(DEFAULT_RESOLUTION));
            assert_eq!(m.label, kind);
            assert!(m.distance < 1e-12, "{kind}: {}", m.distance);
        }
    }

    #[test]
    fn rescaled_shapes_match_their_class() {
        let matcher = TemplateMatcher::new();
        assert_eq!(matcher.classify(&circle_mask(200, 45)).label, ShapeKind::Circle);
        assert_eq!(matcher.classify(&square_mask(200, 90)).label, ShapeKind::Square);
        assert_eq!(
            matcher.classify(&rectangle_mask(200, 120, 60)).label,
            ShapeKind::Rectangle
        );
        assert_eq!(matcher.classify(&triangle_mask(200, 110)).label, ShapeKind::Triangle);
    }

    #[test]
    fn shifted_mask_keeps_its_label() {
        let matcher = TemplateMatcher::new();
        let mask = square_mask(200, 80).shifted(-30, 25);
        assert_eq!(matcher.classify(&mask).label, ShapeKind::Square);
    }

    #[test]
    fn first_template_wins_exact_tie() {
        let matcher = TemplateMatcher::new();
        let circle = matcher.templates()[0].features;
        let m = matcher.classify_features(&circle);
        assert_eq!(m.label, ShapeKind::Circle);
        assert_eq!(m.distance, 0.0);
    }

    #[test]
    fn default_templates_do_not_follow_query_size() {
        let small = ShapeKind::Triangle.canonical_mask(64);
        let fixed = TemplateMatcher::new().classify(&small);
        let rescaled = TemplateMatcher::with_resolution(64).classify(&small);
        assert!(rescaled.distance < 1e-12);
        assert!(fixed.distance > 1e-3, "{}", fixed.distance);
    }
}
