use kbm_track_core::{homography_from_4pt, Homography, Quad};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::CalibrationError;

/// One committed calibration: detected corners and the transform onto the
/// template rectangle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Corners in camera pixels, `[TL, TR, BR, BL]`.
    pub corners: Quad,
    /// Camera pixel → unrotated template pixel.
    pub matrix: Homography,
    /// Template (rectified output) width in pixels.
    pub width: u32,
    /// Template (rectified output) height in pixels.
    pub height: u32,
}

impl Calibration {
    /// Homography sending `corners` onto `[(0,0), (W,0), (W,H), (0,H)]`.
    pub fn from_corners(corners: Quad, width: u32, height: u32) -> Result<Self, CalibrationError> {
        let (w, h) = (width as f32, height as f32);
        let rect = [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ];
        let matrix =
            homography_from_4pt(corners.corners(), &rect).ok_or(CalibrationError::HomographyFailed)?;
        Ok(Self {
            corners,
            matrix,
            width,
            height,
        })
    }

    /// Template pixel → camera pixel.
    pub fn inverse_matrix(&self) -> Result<Homography, CalibrationError> {
        self.matrix.inverse().ok_or(CalibrationError::NonInvertible)
    }
}

/// The calibration currently in use, if any.
///
/// Starts empty. Only [`CalibrationEngine::recalibrate`](crate::CalibrationEngine::recalibrate)
/// replaces it, and only with a complete result, so readers never observe a
/// half-updated value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    current: Option<Calibration>,
}

impl CalibrationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_calibrated(&self) -> bool {
        self.current.is_some()
    }

    pub fn calibration(&self) -> Option<&Calibration> {
        self.current.as_ref()
    }

    pub fn corners(&self) -> Option<&Quad> {
        self.current.as_ref().map(|c| &c.corners)
    }

    pub fn matrix(&self) -> Option<&Homography> {
        self.current.as_ref().map(|c| &c.matrix)
    }

    pub(crate) fn install(&mut self, calibration: Calibration) {
        self.current = Some(calibration);
    }
}

impl From<Calibration> for CalibrationState {
    fn from(calibration: Calibration) -> Self {
        Self {
            current: Some(calibration),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn corners_land_on_template_rectangle() {
        let quad = Quad::new([
            Point2::new(112.0, 87.0),
            Point2::new(701.0, 120.0),
            Point2::new(688.0, 540.0),
            Point2::new(95.0, 512.0),
        ])
        .expect("quad");
        let calib = Calibration::from_corners(quad, 800, 600).expect("calibration");

        let expected = [(0.0, 0.0), (800.0, 0.0), (800.0, 600.0), (0.0, 600.0)];
        for (corner, (ex, ey)) in quad.corners().iter().zip(expected) {
            let p = calib.matrix.apply(*corner);
            assert_abs_diff_eq!(p.x, ex, epsilon = 1e-2);
            assert_abs_diff_eq!(p.y, ey, epsilon = 1e-2);
        }

        let back = calib.inverse_matrix().expect("invertible").apply(Point2::new(800.0, 600.0));
        assert_abs_diff_eq!(back.x, 688.0, epsilon = 1e-2);
        assert_abs_diff_eq!(back.y, 540.0, epsilon = 1e-2);
    }

    #[test]
    fn state_starts_empty() {
        let state = CalibrationState::new();
        assert!(!state.is_calibrated());
        assert!(state.corners().is_none());
        assert!(state.matrix().is_none());
    }
}
