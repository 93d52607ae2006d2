//! Canonical shape rasterizers on a square canvas.

use std::fmt;

use hutree_image::BinaryMask;

/// The four shape classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ShapeKind {
    /// Filled disc.
    Circle,
    /// Axis-aligned square.
    Square,
    /// Axis-aligned rectangle.
    Rectangle,
    /// Equilateral triangle, base on top.
    Triangle,
}

impl ShapeKind {
    /// Every shape, in template order.
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Circle,
        ShapeKind::Square,
        ShapeKind::Rectangle,
        ShapeKind::Triangle,
    ];

    /// Class label used in datasets and reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ShapeKind::Circle => "Circle",
            ShapeKind::Square => "Square",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Triangle => "Triangle",
        }
    }

    /// Parse a case-insensitive shape name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(name))
    }

    /// Reference mask on an `n x n` canvas.
    ///
    /// | Shape | Size |
    /// |---|---|
    /// | Circle | radius `⌊0.35 n⌋` |
    /// | Square | side `⌊0.6 n⌋` |
    /// | Rectangle | `⌊0.7 n⌋ x ⌊0.35 n⌋` |
    /// | Triangle | side `⌊0.7 n⌋` |
    #[must_use]
    pub fn canonical_mask(self, n: usize) -> BinaryMask {
        match self {
            ShapeKind::Circle => circle_mask(n, scaled(n, 0.35)),
            ShapeKind::Square => square_mask(n, scaled(n, 0.6)),
            ShapeKind::Rectangle => rectangle_mask(n, scaled(n, 0.7), scaled(n, 0.35)),
            ShapeKind::Triangle => triangle_mask(n, scaled(n, 0.7)),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn scaled(n: usize, ratio: f64) -> usize {
    (ratio * n as f64) as usize
}

/// Disc of radius `r` centered at `(n / 2, n / 2)`: `dx² + dy² <= r²`.
#[must_use]
pub fn circle_mask(n: usize, r: usize) -> BinaryMask {
    let c = (n / 2) as i64;
    let r2 = (r * r) as i64;
    BinaryMask::from_fn(n, n, |row, col| {
        let (dx, dy) = (col as i64 - c, row as i64 - c);
        dx * dx + dy * dy <= r2
    })
}

/// Centered square with the given side, clipped to the canvas.
#[must_use]
pub fn square_mask(n: usize, side: usize) -> BinaryMask {
    rectangle_mask(n, side, side)
}

/// Centered axis-aligned rectangle, clipped to the canvas. Zero sizes are raised to 1.
#[must_use]
pub fn rectangle_mask(n: usize, width: usize, height: usize) -> BinaryMask {
    let (w, h) = (width.max(1), height.max(1));
    let x0 = n.saturating_sub(w) / 2;
    let y0 = n.saturating_sub(h) / 2;
    BinaryMask::from_fn(n, n, |row, col| {
        (y0..y0 + h).contains(&row) && (x0..x0 + w).contains(&col)
    })
}

/// Equilateral triangle with the given side, widest row on top.
///
/// Rows run from `(n - side) / 2` down `round(side · √3 / 2)` rows; each row
/// spans `cx ± round((1 - t) · ⌊side / 2⌋)` where `t` goes 0 → 1 from the
/// top row to the vertex. Rows and spans are clipped to the canvas.
#[must_use]
pub fn triangle_mask(n: usize, side: usize) -> BinaryMask {
    let mut mask = BinaryMask::empty(n, n);
    if n == 0 {
        return mask;
    }
    let cx = (n / 2) as i64;
    let y_top = n.saturating_sub(side) / 2;
    let h = (side as f64 * 3f64.sqrt() / 2.0).round_ties_even() as usize;
    let y_base = (n - 1).min(y_top + h);
    let span = (y_base - y_top).max(1) as f64;
    let half_side = (side / 2) as f64;

    for y in y_top..=y_base {
        let t = (y - y_top) as f64 / span;
        let half = ((1.0 - t) * half_side).round_ties_even() as i64;
        let x_left = (cx - half).max(0) as usize;
        let x_right = (cx + half).min(n as i64 - 1) as usize;
        for x in x_left..=x_right {
            mask.set(y, x, true);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_side_and_position() {
        let m = square_mask(200, 120);
        assert_eq!(m.count(), 120 * 120);
        assert!(m.get(40, 40));
        assert!(!m.get(39, 40));
        assert!(m.get(159, 159));
        assert!(!m.get(160, 159));
    }

    #[test]
    fn oversized_rectangle_is_clipped() {
        let m = rectangle_mask(10, 30, 4);
        assert_eq!(m.count(), 40);
    }

    #[test]
    fn circle_is_symmetric() {
        let m = circle_mask(41, 12);
        for row in 0..41 {
            for col in 0..41 {
                assert_eq!(m.get(row, col), m.get(40 - row, 40 - col));
                assert_eq!(m.get(row, col), m.get(col, row));
            }
        }
    }

    #[test]
    fn triangle_rows_narrow_toward_vertex() {
        let m = triangle_mask(200, 140);
        // top row 30 spans the full side, the bottom row is a single vertex
        let width = |row: usize| (0..200).filter(|&c| m.get(row, c)).count();
        assert_eq!(width(29), 0);
        assert_eq!(width(30), 141);
        assert_eq!(width(30 + 121), 1);
        assert!((30..151).all(|r| width(r) >= width(r + 1)));
    }

    #[test]
    fn canonical_sizes() {
        let rect = ShapeKind::Rectangle.canonical_mask(200);
        assert_eq!(rect.count(), 140 * 70);
        assert_eq!(ShapeKind::Square.canonical_mask(200).count(), 120 * 120);
    }

    #[test]
    fn parse_round_trips_labels() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::parse(kind.label()), Some(kind));
        }
        assert_eq!(ShapeKind::parse("circle"), Some(ShapeKind::Circle));
        assert_eq!(ShapeKind::parse("hexagon"), None);
    }
}
