//! Webcam tracking of a printed keyboard/mouse-pad template.
//!
//! This crate ties together:
//! - [`calib`]: locating the template in camera frames and deriving the
//!   rectifying homography, robust to a hand covering part of it;
//! - [`regions`]: the static button grid and key bindings of the template;
//! - [`ProjectionService`]: rectified views of live frames and mapping of
//!   camera points (e.g. fingertips) onto keys.
//!
//! ## Quickstart
//!
//! ```no_run
//! use kbm_track::{FrameBatch, ImageFileSource, KbmTrackConfig, KbmTracker};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = KbmTrackConfig::load_json("kbm.json")?;
//! let mut tracker = KbmTracker::from_config(&config)?;
//!
//! let mut source = ImageFileSource::new(["f0.png", "f1.png", "f2.png", "f3.png", "f4.png"]);
//! let mut batch = FrameBatch::new(config.calibration.batch_size);
//! while source.remaining() > 0 {
//!     if let Some(frames) = batch.poll(&mut source) {
//!         tracker.recalibrate(&frames);
//!     }
//! }
//!
//! if let Some(frame) = image::open("live.png").ok().map(|i| i.to_rgb8()) {
//!     let view = tracker.project_with_overlay(&frame);
//!     println!("rectified: {}", view.is_some());
//! }
//! # Ok(())
//! # }
//! ```

pub use kbm_track_calib as calib;
pub use kbm_track_core as core;
pub use kbm_track_regions as regions;

pub use kbm_track_calib::{
    Calibration, CalibrationEngine, CalibrationError, CalibrationParams, CalibrationState,
    FrameBatch, FrameSource, Recalibration,
};
pub use kbm_track_core::{init_with_level, Homography, Quad};
pub use kbm_track_regions::{
    CropBounds, KeyBindings, KeyMap, RegionExtractor, RegionGrid, RegionId, RegionParams,
    TemplateModel,
};

#[cfg(feature = "tracing")]
pub use kbm_track_core::init_tracing;

mod io;
mod project;
mod source;
mod tracker;

pub use io::{CalibrationReport, KbmIoError, KbmTrackConfig};
pub use project::{draw_points, fingertips_to_pixels, ProjectionService, FINGERTIP_INDICES};
pub use source::ImageFileSource;
pub use tracker::{KbmTracker, SetupError};
