//! Shape descriptors from binary masks.
//!
//! Raw, central and normalized central moments up to order three, the seven
//! Hu invariants, the log-magnitude feature transform, canonical shape
//! rasterizers, and a nearest-template classifier in log-Hu space.

mod feature;
mod geometry;
mod hu;
mod moments;
mod raster;
mod template;

pub use feature::{FEATURE_NAMES, FeatureVector, N_FEATURES, extract_features, feature_names};
pub use geometry::{AxisSegment, BoundingBox, centroid, orientation, principal_axis, size_area};
pub use hu::{HuVector, hu_from_normalized, hu_moments};
pub use moments::{MomentSet, central_moment, normalized_central_moment, raw_moment};
pub use raster::{ShapeKind, circle_mask, rectangle_mask, square_mask, triangle_mask};
pub use template::{DEFAULT_RESOLUTION, Template, TemplateMatch, TemplateMatcher};
