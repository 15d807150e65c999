use serde::{Deserialize, Serialize};

/// Pixels cut from each edge of the template asset before use.
///
/// The printed template is scanned with a margin that is not part of the
/// pad; the defaults remove it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CropBounds {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl CropBounds {
    /// Keep the whole image.
    pub const fn none() -> Self {
        Self {
            top: 0,
            bottom: 0,
            left: 0,
            right: 0,
        }
    }
}

impl Default for CropBounds {
    fn default() -> Self {
        Self {
            top: 0,
            bottom: 39,
            left: 39,
            right: 16,
        }
    }
}

/// Button segmentation settings.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegionParams {
    /// Inverted gray level above which a pixel is printed ink.
    pub invert_threshold: u8,
    /// Median filter radius (1 = 3×3).
    pub median_radius: u32,
    /// Chebyshev erosion radius (2 = 5×5).
    pub erode_radius: u8,
    /// Top/bottom padding excluded from the row layout, as a fraction of the
    /// template height.
    pub pad_frac: f64,
}

impl Default for RegionParams {
    fn default() -> Self {
        Self {
            invert_threshold: 20,
            median_radius: 1,
            erode_radius: 2,
            pad_frac: 0.02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let params: RegionParams =
            serde_json::from_str(r#"{ "invert_threshold": 40 }"#).expect("valid json");
        assert_eq!(params.invert_threshold, 40);
        assert_eq!(params.median_radius, 1);
        assert_eq!(params.pad_frac, 0.02);

        let crop: CropBounds = serde_json::from_str(r#"{ "top": 5 }"#).expect("valid json");
        assert_eq!(
            crop,
            CropBounds {
                top: 5,
                ..CropBounds::default()
            }
        );
    }
}
