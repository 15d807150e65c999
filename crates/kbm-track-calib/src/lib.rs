//! Perspective calibration of a printed keyboard/mouse-pad template.
//!
//! ## Quickstart
//!
//! ```
//! use kbm_track_calib::{CalibrationEngine, CalibrationParams, CalibrationState};
//!
//! let engine = CalibrationEngine::new(800, 600, CalibrationParams::default());
//! let mut state = CalibrationState::new();
//!
//! let frames: Vec<image::RgbImage> = Vec::new();
//! let outcome = engine.recalibrate(&mut state, &frames);
//! assert!(!outcome.is_updated());
//! assert!(!state.is_calibrated());
//! ```
//!
//! Pipeline for one calibration attempt:
//! 1. Per frame: grayscale, blur, fixed luminance threshold, largest external
//!    contour, convex hull, filled and dilated into a silhouette mask.
//! 2. Combine the batch with a per-pixel maximum so a corner hidden by a hand
//!    in one frame is still present if another frame saw it; blur once more.
//! 3. Largest contour of the combined mask, Douglas–Peucker simplification at
//!    2% of its arc length.
//! 4. A [`CornerReconstructionStrategy`] turns the simplified polygon into a
//!    [`Quad`](kbm_track_core::Quad) (the default one rebuilds a corner that the
//!    template silhouette splits in two).
//! 5. Homography from the quad onto the template rectangle.
//!
//! The result is installed into [`CalibrationState`] only when every step
//! succeeds; otherwise the previous calibration stays active.

mod batch;
mod engine;
mod error;
mod mask;
mod params;
mod state;
mod strategy;

#[cfg(test)]
mod test_utils;

pub use batch::{FrameBatch, FrameSource};
pub use engine::{CalibrationEngine, Recalibration};
pub use error::CalibrationError;
pub use mask::{combine_masks, largest_outer_contour, template_mask};
pub use params::{CalibrationParams, MaskParams};
pub use state::{Calibration, CalibrationState};
pub use strategy::{CornerReconstructionStrategy, QuadCornerStrategy, SplitCornerStrategy};
