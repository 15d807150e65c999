use serde::{Deserialize, Serialize};

/// Per-frame silhouette extraction settings.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MaskParams {
    /// Gray level above which a pixel counts as template material.
    ///
    /// The template is assumed brighter than its surroundings.
    pub luminance_threshold: u8,

    /// Gaussian sigma applied before thresholding (roughly a 5×5 kernel).
    pub blur_sigma: f32,

    /// Chebyshev radius of the dilation kernel (2 = 5×5 square).
    pub dilate_radius: u8,

    /// How many times the dilation is applied.
    pub dilate_iterations: u32,
}

impl Default for MaskParams {
    fn default() -> Self {
        Self {
            luminance_threshold: 150,
            blur_sigma: 1.1,
            dilate_radius: 2,
            dilate_iterations: 2,
        }
    }
}

/// Parameters of the calibration engine.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalibrationParams {
    pub mask: MaskParams,

    /// Frames collected per calibration attempt.
    pub batch_size: usize,

    /// Gaussian sigma applied to the combined mask before contour extraction.
    pub combined_blur_sigma: f32,

    /// Polygon simplification tolerance as a fraction of contour arc length.
    pub approx_epsilon_frac: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            mask: MaskParams::default(),
            batch_size: 5,
            combined_blur_sigma: 1.1,
            approx_epsilon_frac: 0.02,
        }
    }
}
