use image::{imageops, GrayImage, Rgb, RgbImage};
use imageproc::contours::find_contours;
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::filter::median_filter;
use imageproc::morphology::erode;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::grid::{BoundingBox, RegionGrid, RowLayout, ROW_COUNT};
use crate::{RegionParams, TemplateModel};

/// Outline colour per row: red, green, blue, cyan, magenta.
pub const ROW_COLORS: [Rgb<u8>; ROW_COUNT] = [
    Rgb([255, 0, 0]),
    Rgb([0, 255, 0]),
    Rgb([0, 0, 255]),
    Rgb([0, 255, 255]),
    Rgb([255, 0, 255]),
];

/// Segments the printed buttons of a template into a [`RegionGrid`].
#[derive(Clone, Debug, Default)]
pub struct RegionExtractor {
    params: RegionParams,
}

impl RegionExtractor {
    pub fn new(params: RegionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RegionParams {
        &self.params
    }

    /// Ink mask of the template: dark print becomes white foreground.
    pub fn ink_mask(&self, image: &RgbImage) -> GrayImage {
        let mut inverted = imageops::grayscale(image);
        imageops::invert(&mut inverted);
        let binary = threshold(&inverted, self.params.invert_threshold, ThresholdType::Binary);
        let r = self.params.median_radius;
        let smoothed = if r > 0 { median_filter(&binary, r, r) } else { binary };
        if self.params.erode_radius > 0 {
            erode(&smoothed, Norm::LInf, self.params.erode_radius)
        } else {
            smoothed
        }
    }

    /// Bounding boxes of every contour of the ink mask, outer and inner.
    pub fn candidate_boxes(&self, image: &RgbImage) -> Vec<BoundingBox> {
        find_contours::<i32>(&self.ink_mask(image))
            .iter()
            .filter_map(|c| BoundingBox::enclosing(&c.points))
            .collect()
    }

    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, template), fields(w = template.width(), h = template.height())))]
    pub fn extract(&self, template: &TemplateModel) -> RegionGrid {
        let boxes = self.candidate_boxes(template.image());
        let candidates = boxes.len();
        let layout = RowLayout::new(template.height(), self.params.pad_frac);
        let grid = RegionGrid::assign_rows(boxes, &layout);
        log::debug!(
            "{candidates} candidate regions, {} kept; per row {:?}",
            grid.len(),
            grid.rows().iter().map(Vec::len).collect::<Vec<_>>()
        );
        grid
    }
}

/// Outline every region of `grid` on a copy of `image`, coloured by row.
pub fn draw_region_overlay(image: &RgbImage, grid: &RegionGrid) -> RgbImage {
    let mut out = image.clone();
    for (id, bbox) in grid.iter() {
        let color = ROW_COLORS[id.row % ROW_COUNT];
        let rect = bbox.to_rect();
        draw_hollow_rect_mut(&mut out, rect, color);
        if rect.width() > 2 && rect.height() > 2 {
            let inner = imageproc::rect::Rect::at(rect.left() + 1, rect.top() + 1)
                .of_size(rect.width() - 2, rect.height() - 2);
            draw_hollow_rect_mut(&mut out, inner, color);
        }
    }
    out
}
