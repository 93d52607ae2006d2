/// Errors from constructing images and masks.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// Returned when a row-based constructor receives no rows or zero-width rows.
    #[error("image has zero rows or zero columns")]
    EmptyImage,

    /// Returned when rows of a row-based constructor differ in length.
    #[error("row {row_index} has {got} columns, expected {expected}")]
    RaggedRows {
        /// Zero-based index of the offending row.
        row_index: usize,
        /// Column count of the first row.
        expected: usize,
        /// Column count of the offending row.
        got: usize,
    },

    /// Returned when a flat buffer does not hold exactly `width * height` values.
    #[error("buffer holds {got} values, expected {width}x{height} = {expected}")]
    DimensionMismatch {
        /// Declared width in pixels.
        width: usize,
        /// Declared height in pixels.
        height: usize,
        /// `width * height`.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },
}
