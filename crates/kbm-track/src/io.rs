//! JSON configuration and report helpers for the `kbm-track` tool.

use std::fs;
use std::path::Path;

use kbm_track_calib::{Calibration, CalibrationError, CalibrationParams};
use kbm_track_core::Quad;
use kbm_track_regions::{CropBounds, RegionGrid, RegionParams, ROW_COUNT};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum KbmIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_template_path() -> String {
    "Resources/kbm_template.jpg".to_string()
}

fn default_keymap_path() -> Option<String> {
    Some("Resources/keyMappings.csv".to_string())
}

/// Everything needed to set up a tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KbmTrackConfig {
    #[serde(default = "default_template_path")]
    pub template_path: String,
    /// Key table CSV. An explicit `null` runs without key bindings.
    #[serde(default = "default_keymap_path")]
    pub keymap_path: Option<String>,
    #[serde(default)]
    pub crop: CropBounds,
    #[serde(default)]
    pub calibration: CalibrationParams,
    #[serde(default)]
    pub regions: RegionParams,
    #[serde(default)]
    pub rectified_path: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
}

impl Default for KbmTrackConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            keymap_path: default_keymap_path(),
            crop: CropBounds::default(),
            calibration: CalibrationParams::default(),
            regions: RegionParams::default(),
            rectified_path: None,
            report_path: None,
        }
    }
}

impl KbmTrackConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, KbmIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), KbmIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Outcome of one calibration run, as written by `kbm-track calibrate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub config_path: String,
    pub frame_paths: Vec<String>,
    pub template_width: u32,
    pub template_height: u32,
    pub region_count: usize,
    pub regions_per_row: [usize; ROW_COUNT],
    #[serde(default)]
    pub corners: Option<Quad>,
    #[serde(default)]
    pub matrix: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    pub rectified_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CalibrationReport {
    pub fn new(config_path: &Path, frame_paths: &[impl AsRef<Path>], size: (u32, u32), grid: &RegionGrid) -> Self {
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            frame_paths: frame_paths
                .iter()
                .map(|p| p.as_ref().to_string_lossy().into_owned())
                .collect(),
            template_width: size.0,
            template_height: size.1,
            region_count: grid.len(),
            regions_per_row: std::array::from_fn(|row| grid.rows()[row].len()),
            corners: None,
            matrix: None,
            rectified_path: None,
            error: None,
        }
    }

    pub fn set_calibration(&mut self, calibration: &Calibration) {
        self.corners = Some(calibration.corners);
        self.matrix = Some(calibration.matrix.to_array());
        self.error = None;
    }

    pub fn set_error(&mut self, err: &CalibrationError) {
        self.error = Some(err.to_string());
    }

    pub fn is_calibrated(&self) -> bool {
        self.corners.is_some()
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, KbmIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), KbmIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_fill_missing_fields() {
        let cfg: KbmTrackConfig =
            serde_json::from_str(r#"{ "template_path": "pad.png", "crop": { "bottom": 10 } }"#)
                .expect("config");
        assert_eq!(cfg.template_path, "pad.png");
        assert_eq!(cfg.keymap_path, KbmTrackConfig::default().keymap_path);
        assert_eq!(cfg.crop.bottom, 10);
        assert_eq!(cfg.crop.left, 39);
        assert_eq!(cfg.calibration.batch_size, 5);
        assert_eq!(cfg.regions.invert_threshold, 20);
    }

    #[test]
    fn null_keymap_path_disables_bindings() {
        let cfg: KbmTrackConfig =
            serde_json::from_str(r#"{ "keymap_path": null }"#).expect("config");
        assert_eq!(cfg.keymap_path, None);
        assert_eq!(cfg.template_path, "Resources/kbm_template.jpg");
    }

    #[test]
    fn config_survives_disk_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("kbm.json");
        let cfg = KbmTrackConfig::default();
        cfg.write_json(&path).expect("write");
        assert_eq!(KbmTrackConfig::load_json(&path).expect("load"), cfg);
    }
}
