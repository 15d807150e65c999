use std::path::{Path, PathBuf};

use image::{imageops, ImageError, RgbImage};

use crate::CropBounds;

#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode template {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("crop {bounds:?} leaves nothing of a {width}x{height} template")]
    CropOutOfBounds {
        bounds: CropBounds,
        width: u32,
        height: u32,
    },
}

/// The reference template, cropped to the pad area.
///
/// Its size defines the rectified coordinate space: calibration maps the
/// camera view onto a `width × height` raster.
#[derive(Clone, Debug)]
pub struct TemplateModel {
    image: RgbImage,
    bounds: CropBounds,
    source_size: (u32, u32),
}

impl TemplateModel {
    /// Read and crop the template asset at `path`.
    pub fn load(path: impl AsRef<Path>, bounds: CropBounds) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|err| match err {
            ImageError::IoError(source) => TemplateError::Io {
                path: path.to_path_buf(),
                source,
            },
            source => TemplateError::Decode {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let model = Self::from_image(decoded.to_rgb8(), bounds)?;
        log::debug!(
            "template {}: {}x{} cropped to {}x{}",
            path.display(),
            model.source_size.0,
            model.source_size.1,
            model.width(),
            model.height()
        );
        Ok(model)
    }

    pub fn from_image(image: RgbImage, bounds: CropBounds) -> Result<Self, TemplateError> {
        let (width, height) = image.dimensions();
        let out_of_bounds = || TemplateError::CropOutOfBounds {
            bounds,
            width,
            height,
        };
        let crop_w = width
            .checked_sub(bounds.left)
            .and_then(|w| w.checked_sub(bounds.right))
            .filter(|&w| w > 0)
            .ok_or_else(out_of_bounds)?;
        let crop_h = height
            .checked_sub(bounds.top)
            .and_then(|h| h.checked_sub(bounds.bottom))
            .filter(|&h| h > 0)
            .ok_or_else(out_of_bounds)?;

        let cropped = imageops::crop_imm(&image, bounds.left, bounds.top, crop_w, crop_h).to_image();
        Ok(Self {
            image: cropped,
            bounds,
            source_size: (width, height),
        })
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn bounds(&self) -> CropBounds {
        self.bounds
    }

    /// Size of the asset before cropping.
    pub fn source_size(&self) -> (u32, u32) {
        self.source_size
    }
}
