//! Randomized training set of rasterized shapes.

use hutree_image::BinaryMask;
use hutree_moments::{
    ShapeKind, circle_mask, extract_features, rectangle_mask, square_mask, triangle_mask,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument, warn};

use crate::{DataError, Dataset, LabeledSample};

/// Classes are generated in this order, `per_class` samples each.
const GENERATION_ORDER: [ShapeKind; 4] = [
    ShapeKind::Circle,
    ShapeKind::Square,
    ShapeKind::Triangle,
    ShapeKind::Rectangle,
];

/// Rectangles closer than this to square get their width widened.
const MIN_ASPECT_GAP: usize = 30;
const ASPECT_WIDENING: usize = 40;

/// Builder for the synthetic shape dataset.
///
/// Every sample is one shape centered on a `canvas x canvas` mask with a
/// randomly drawn size (all ranges inclusive):
///
/// | Shape | Size |
/// |---|---|
/// | Circle | radius in [20, 90] |
/// | Square | side in [30, 150] |
/// | Triangle | side in [40, 160] |
/// | Rectangle | width in [40, 160], height in [30, 100]; width += 40 when `|width - height| < 30` |
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `per_class` | 25 |
/// | `canvas` | 200 |
/// | `seed` | 42 |
#[derive(Debug, Clone)]
pub struct SyntheticShapes {
    per_class: usize,
    canvas: usize,
    seed: u64,
}

impl SyntheticShapes {
    /// Create a builder with the defaults above.
    pub fn new() -> Self {
        Self {
            per_class: 25,
            canvas: 200,
            seed: 42,
        }
    }

    /// Set the number of samples generated per class.
    #[must_use]
    pub fn with_per_class(mut self, per_class: usize) -> Self {
        self.per_class = per_class;
        self
    }

    /// Set the canvas side length in pixels.
    #[must_use]
    pub fn with_canvas(mut self, canvas: usize) -> Self {
        self.canvas = canvas;
        self
    }

    /// Set the seed used by [`SyntheticShapes::build`].
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Samples per class.
    pub fn per_class(&self) -> usize {
        self.per_class
    }

    /// Canvas side length in pixels.
    pub fn canvas(&self) -> usize {
        self.canvas
    }

    /// Seed used by [`SyntheticShapes::build`].
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate the dataset with a `ChaCha8Rng` seeded from [`SyntheticShapes::seed`].
    ///
    /// # Errors
    ///
    /// See [`SyntheticShapes::build_with_rng`].
    pub fn build(&self) -> Result<Dataset, DataError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.build_with_rng(&mut rng)
    }

    /// Generate the dataset drawing every shape size from `rng`.
    ///
    /// Samples whose features are not all finite are skipped, so the result
    /// may hold fewer than `4 * per_class` rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DataError::InvalidClassSize`] | `per_class == 0` |
    /// | [`DataError::InvalidCanvas`] | `canvas == 0` |
    #[instrument(skip_all, fields(per_class = self.per_class, canvas = self.canvas))]
    pub fn build_with_rng<R: Rng>(&self, rng: &mut R) -> Result<Dataset, DataError> {
        if self.per_class == 0 {
            return Err(DataError::InvalidClassSize {
                per_class: self.per_class,
            });
        }
        if self.canvas == 0 {
            return Err(DataError::InvalidCanvas {
                canvas: self.canvas,
            });
        }

        let mut dataset = Dataset::new();
        let mut skipped = 0usize;
        for kind in GENERATION_ORDER {
            for i in 0..self.per_class {
                let mask = draw_shape(kind, self.canvas, rng);
                let features = extract_features(&mask);
                if !features.is_finite() {
                    warn!(shape = %kind, sample = i, "non-finite features, sample skipped");
                    skipped += 1;
                    continue;
                }
                dataset.push(LabeledSample::new(features, kind.label()))?;
            }
            debug!(shape = %kind, total = dataset.len(), "class generated");
        }

        info!(n_samples = dataset.len(), skipped, "synthetic dataset built");
        Ok(dataset)
    }
}

impl Default for SyntheticShapes {
    fn default() -> Self {
        Self::new()
    }
}

fn draw_shape<R: Rng>(kind: ShapeKind, canvas: usize, rng: &mut R) -> BinaryMask {
    match kind {
        ShapeKind::Circle => circle_mask(canvas, rng.gen_range(20..=90)),
        ShapeKind::Square => square_mask(canvas, rng.gen_range(30..=150)),
        ShapeKind::Triangle => triangle_mask(canvas, rng.gen_range(40..=160)),
        ShapeKind::Rectangle => {
            let mut width: usize = rng.gen_range(40..=160);
            let height: usize = rng.gen_range(30..=100);
            if width.abs_diff(height) < MIN_ASPECT_GAP {
                width += ASPECT_WIDENING;
            }
            rectangle_mask(canvas, width, height)
        }
    }
}
