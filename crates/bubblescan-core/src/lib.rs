//! Core types shared by the `bubblescan-*` crates.
//!
//! Everything here is independent of any image codec: rasters are plain
//! row-major byte buffers, and the geometry helpers work on `nalgebra` points.

mod geometry;
mod image;
mod logger;
mod threshold;

pub use geometry::{convex_hull, min_enclosing_circle, polygon_area, Circle};
pub use image::{crop, GrayImage, GrayImageView, Region};
pub use threshold::{binarize, BinaryMask, FOREGROUND};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level};
