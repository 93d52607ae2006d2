//! Labeled shape datasets for the hutree classifiers.
//!
//! A [`Dataset`] holds log-Hu feature rows with string labels, ready for
//! the estimators in `hutree-rf`. [`SyntheticShapes`] generates the
//! randomized training set of circles, squares, triangles and rectangles;
//! [`render_scene`] paints a canonical shape as a grayscale image so the
//! whole equalize, threshold and classify pipeline can run without decoding
//! image files.

mod dataset;
mod error;
mod scene;
mod synthetic;

pub use dataset::{Dataset, LabeledSample};
pub use error::DataError;
pub use scene::{render_mask, render_scene};
pub use synthetic::SyntheticShapes;
