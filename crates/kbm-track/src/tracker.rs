use image::RgbImage;
use kbm_track_calib::{CalibrationEngine, CalibrationState, Recalibration};
use kbm_track_regions::{
    BindingError, KeyBindings, KeyMap, KeyMapError, RegionExtractor, RegionGrid, RegionId,
    TemplateError, TemplateModel,
};
use nalgebra::Point2;

use crate::{KbmTrackConfig, ProjectionService};

/// Startup failures: the template or key map cannot be used.
#[derive(thiserror::Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    KeyMap(#[from] KeyMapError),
    #[error(transparent)]
    Binding(#[from] BindingError),
}

/// Template, region grid, key bindings and live calibration in one place.
#[derive(Debug)]
pub struct KbmTracker {
    template: TemplateModel,
    engine: CalibrationEngine,
    state: CalibrationState,
    projector: ProjectionService,
    bindings: KeyBindings,
}

impl KbmTracker {
    /// Load the template (and key map, if configured) named by `config`.
    pub fn from_config(config: &KbmTrackConfig) -> Result<Self, SetupError> {
        let template = TemplateModel::load(&config.template_path, config.crop)?;
        let keymap = match &config.keymap_path {
            Some(path) => KeyMap::load(path)?,
            None => KeyMap::default(),
        };
        Self::new(template, &keymap, config)
    }

    pub fn new(template: TemplateModel, keymap: &KeyMap, config: &KbmTrackConfig) -> Result<Self, SetupError> {
        let grid = RegionExtractor::new(config.regions.clone()).extract(&template);
        let bindings = KeyBindings::bind(keymap, &grid)?;
        let engine = CalibrationEngine::new(
            template.width(),
            template.height(),
            config.calibration.clone(),
        );
        log::info!(
            "template {}x{}: {} regions, {} bound to keys",
            template.width(),
            template.height(),
            grid.len(),
            bindings.len()
        );
        Ok(Self {
            template,
            engine,
            state: CalibrationState::new(),
            projector: ProjectionService::new(grid),
            bindings,
        })
    }

    pub fn template(&self) -> &TemplateModel {
        &self.template
    }

    pub fn grid(&self) -> &RegionGrid {
        self.projector.grid()
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn engine(&self) -> &CalibrationEngine {
        &self.engine
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn projector(&self) -> &ProjectionService {
        &self.projector
    }

    pub fn recalibrate(&mut self, frames: &[RgbImage]) -> Recalibration {
        self.engine.recalibrate(&mut self.state, frames)
    }

    pub fn project(&self, frame: &RgbImage) -> Option<RgbImage> {
        self.projector.project(&self.state, frame)
    }

    /// Rectified view of `frame` with the region grid drawn on it.
    pub fn project_with_overlay(&self, frame: &RgbImage) -> Option<RgbImage> {
        self.project(frame)
            .map(|rectified| self.projector.draw_region_overlay(&rectified))
    }

    pub fn region_at(&self, p_img: Point2<f32>) -> Option<RegionId> {
        self.projector.region_at(&self.state, p_img)
    }

    pub fn key_at(&self, p_img: Point2<f32>) -> Option<&str> {
        self.projector.key_at(&self.state, &self.bindings, p_img)
    }
}
