use image::{GrayImage, RgbImage};
use imageproc::geometry::arc_length;
use kbm_track_core::{simplify_closed_polygon, Quad};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::mask::{combine_masks, largest_outer_contour, template_mask, to_points};
use crate::state::{Calibration, CalibrationState};
use crate::strategy::{CornerReconstructionStrategy, SplitCornerStrategy};
use crate::{CalibrationError, CalibrationParams};

/// Outcome of [`CalibrationEngine::recalibrate`].
#[derive(Clone, Debug, PartialEq)]
pub enum Recalibration {
    /// The new calibration was installed.
    Updated,
    /// The attempt failed; the state is exactly what it was before.
    KeptPrevious { reason: CalibrationError },
}

impl Recalibration {
    pub fn is_updated(&self) -> bool {
        matches!(self, Recalibration::Updated)
    }
}

/// Detects the template in raw frames and derives the rectifying homography.
#[derive(Debug)]
pub struct CalibrationEngine {
    params: CalibrationParams,
    strategy: Box<dyn CornerReconstructionStrategy>,
    template_width: u32,
    template_height: u32,
}

impl CalibrationEngine {
    /// Engine rectifying onto a `template_width × template_height` template
    /// with the default [`SplitCornerStrategy`].
    pub fn new(template_width: u32, template_height: u32, params: CalibrationParams) -> Self {
        Self {
            params,
            strategy: Box::new(SplitCornerStrategy),
            template_width,
            template_height,
        }
    }

    pub fn with_strategy(mut self, strategy: impl CornerReconstructionStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    pub fn template_size(&self) -> (u32, u32) {
        (self.template_width, self.template_height)
    }

    /// Silhouette of the template combined over every usable frame.
    ///
    /// Frames whose size differs from the first one, or in which no template
    /// silhouette is found, are dropped.
    pub fn combined_mask(&self, frames: &[RgbImage]) -> Result<GrayImage, CalibrationError> {
        let first = frames.first().ok_or(CalibrationError::EmptyBatch)?;
        let dims = first.dimensions();

        let mut masks = Vec::with_capacity(frames.len());
        for (i, frame) in frames.iter().enumerate() {
            if frame.dimensions() != dims {
                log::warn!(
                    "frame {i}: size {:?} differs from batch size {:?}, dropped",
                    frame.dimensions(),
                    dims
                );
                continue;
            }
            match template_mask(frame, &self.params.mask) {
                Ok(mask) => masks.push(mask),
                Err(err) => log::debug!("frame {i}: no mask ({err})"),
            }
        }
        log::debug!("{}/{} frames produced a mask", masks.len(), frames.len());

        combine_masks(&masks, self.params.combined_blur_sigma).ok_or(CalibrationError::NoUsableFrames)
    }

    /// Corners of the template in a combined silhouette mask.
    pub fn detect_corners(&self, combined: &GrayImage) -> Result<Quad, CalibrationError> {
        let outline = largest_outer_contour(combined).ok_or(CalibrationError::NoContours)?;
        let epsilon = self.params.approx_epsilon_frac * arc_length(&outline, true);
        let polygon = simplify_closed_polygon(&to_points(&outline), epsilon);
        log::debug!(
            "outline: {} contour points -> {} vertices (eps {epsilon:.2})",
            outline.len(),
            polygon.len()
        );

        let expected = self.strategy.expected_vertices();
        if polygon.len() != expected {
            return Err(CalibrationError::WrongVertexCount {
                expected,
                got: polygon.len(),
            });
        }
        self.strategy
            .reconstruct(&polygon, combined.width(), combined.height())
    }

    /// Run one calibration attempt without touching any state.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, frames), fields(frames = frames.len())))]
    pub fn calibrate(&self, frames: &[RgbImage]) -> Result<Calibration, CalibrationError> {
        let combined = self.combined_mask(frames)?;
        let corners = self.detect_corners(&combined)?;
        Calibration::from_corners(corners, self.template_width, self.template_height)
    }

    /// Calibrate from `frames` and install the result into `state` on success.
    ///
    /// Failures are logged and reported in the returned outcome; `state` is
    /// left untouched in that case.
    pub fn recalibrate(&self, state: &mut CalibrationState, frames: &[RgbImage]) -> Recalibration {
        match self.calibrate(frames) {
            Ok(calibration) => {
                let c = calibration.corners.corners();
                log::info!(
                    "calibrated: TL ({:.1}, {:.1}) TR ({:.1}, {:.1}) BR ({:.1}, {:.1}) BL ({:.1}, {:.1})",
                    c[0].x,
                    c[0].y,
                    c[1].x,
                    c[1].y,
                    c[2].x,
                    c[2].y,
                    c[3].x,
                    c[3].y
                );
                state.install(calibration);
                Recalibration::Updated
            }
            Err(reason) => {
                log::warn!(
                    "calibration failed: {reason}; keeping {} calibration",
                    if state.is_calibrated() { "previous" } else { "no" }
                );
                Recalibration::KeptPrevious { reason }
            }
        }
    }
}
