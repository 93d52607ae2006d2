//! Area, centroid, extent and orientation of a mask.

use hutree_image::BinaryMask;

use crate::moments::MomentSet;

/// Foreground pixel count.
#[must_use]
pub fn size_area(mask: &BinaryMask) -> usize {
    mask.count()
}

/// Mean `(x, y)` of foreground pixels, or `(0.0, 0.0)` for an empty mask.
#[must_use]
pub fn centroid(mask: &BinaryMask) -> (f64, f64) {
    let mut area = 0usize;
    let (mut sx, mut sy) = (0.0f64, 0.0f64);
    for (x, y) in mask.foreground() {
        area += 1;
        sx += x as f64;
        sy += y as f64;
    }
    if area == 0 {
        return (0.0, 0.0);
    }
    (sx / area as f64, sy / area as f64)
}

/// Inclusive pixel extent of the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BoundingBox {
    /// Topmost foreground row.
    pub min_row: usize,
    /// Leftmost foreground column.
    pub min_col: usize,
    /// Bottommost foreground row.
    pub max_row: usize,
    /// Rightmost foreground column.
    pub max_col: usize,
}

impl BoundingBox {
    /// Extent of `mask`, or `None` when it has no foreground.
    #[must_use]
    pub fn of(mask: &BinaryMask) -> Option<Self> {
        mask.foreground().fold(None, |acc, (x, y)| {
            Some(match acc {
                None => Self {
                    min_row: y,
                    min_col: x,
                    max_row: y,
                    max_col: x,
                },
                Some(b) => Self {
                    min_row: b.min_row.min(y),
                    min_col: b.min_col.min(x),
                    max_row: b.max_row.max(y),
                    max_col: b.max_col.max(x),
                },
            })
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }
}

/// Principal-axis angle in radians: `0.5 * atan2(2 μ11, μ20 - μ02)`.
///
/// When `μ20 == μ02` the denominator is replaced by `1e-12`. Empty masks give 0.0.
#[must_use]
pub fn orientation(mask: &BinaryMask) -> f64 {
    let m = MomentSet::from_mask(mask);
    if m.is_empty() {
        return 0.0;
    }
    angle_from(&m)
}

fn angle_from(m: &MomentSet) -> f64 {
    let diff = m.central(2, 0) - m.central(0, 2);
    let diff = if diff != 0.0 { diff } else { 1e-12 };
    0.5 * (2.0 * m.central(1, 1)).atan2(diff)
}

/// Line segment along the principal axis, for overlay renderers.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct AxisSegment {
    /// First endpoint `(x, y)`.
    pub start: (f64, f64),
    /// Second endpoint `(x, y)`.
    pub end: (f64, f64),
    /// Axis angle in radians.
    pub angle: f64,
}

/// Principal axis through the centroid with half-length `0.4 * max(width, height)`.
///
/// An empty mask yields a zero-length segment at the origin.
#[must_use]
pub fn principal_axis(mask: &BinaryMask) -> AxisSegment {
    let m = MomentSet::from_mask(mask);
    let (xc, yc) = m.centroid();
    if m.is_empty() {
        return AxisSegment {
            start: (xc, yc),
            end: (xc, yc),
            angle: 0.0,
        };
    }
    let angle = angle_from(&m);
    let half = mask.width().max(mask.height()) as f64 * 0.4;
    let (dx, dy) = (half * angle.cos(), half * angle.sin());
    AxisSegment {
        start: (xc - dx, yc - dy),
        end: (xc + dx, yc + dy),
        angle,
    }
}
