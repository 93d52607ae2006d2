//! Grayscale images and binary masks: histograms, equalization, thresholding.
//!
//! Images arrive here already decoded. This crate turns a grayscale raster
//! into the binary foreground mask consumed by the moment computations.

mod error;
mod histogram;
mod image;
mod threshold;

pub use error::ImageError;
pub use histogram::{Histogram, equalize, histogram_256};
pub use image::{BinaryMask, GrayscaleImage};
pub use threshold::{threshold, threshold_between};
