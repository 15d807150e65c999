//! Core types and utilities for keyboard/mouse-pad template tracking.
//!
//! This crate is purely geometric: line and polygon primitives, a small
//! homography toolkit and an RGB perspective warp. It knows nothing about
//! contours, templates or key maps; those live in the calibration and region
//! crates built on top of it.
//!
//! Points are `nalgebra::Point2<f32>` in image pixel coordinates (x to the
//! right, y down). Internal arithmetic is done in `f64`.

mod geometry;
mod homography;
mod logger;
mod raster;

pub use geometry::{
    line_intersection, order_quad_corners, simplify_closed_polygon,
    sort_by_distance, Quad, QuadError,
};
pub use homography::{homography_from_4pt, Homography};
pub use raster::{sample_bilinear_rgb, warp_perspective_rgb};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
