//! Template silhouette extraction from raw camera frames.

use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_polygon_mut;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{contour_area, convex_hull};
use imageproc::morphology::dilate;
use imageproc::point::Point;
use nalgebra::Point2;

use crate::{CalibrationError, MaskParams};

pub(crate) fn to_points(contour: &[Point<i32>]) -> Vec<Point2<f32>> {
    contour
        .iter()
        .map(|p| Point2::new(p.x as f32, p.y as f32))
        .collect()
}

fn blur(img: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        gaussian_blur_f32(img, sigma)
    } else {
        img.clone()
    }
}

/// Outer border of largest enclosed area among the non-zero regions of `mask`.
pub fn largest_outer_contour(mask: &GrayImage) -> Option<Vec<Point<i32>>> {
    find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer))
        .map(|c| (contour_area(&c.points), c.points))
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, points)| points)
}

/// Filled, dilated convex silhouette of the brightest large object in `frame`.
pub fn template_mask(frame: &RgbImage, params: &MaskParams) -> Result<GrayImage, CalibrationError> {
    let gray = blur(&imageops::grayscale(frame), params.blur_sigma);
    let binary = threshold(&gray, params.luminance_threshold, ThresholdType::Binary);

    let outline = largest_outer_contour(&binary).ok_or(CalibrationError::NoContours)?;
    let mut hull = convex_hull(outline.as_slice());
    if hull.len() > 1 && hull.first() == hull.last() {
        hull.pop();
    }
    if hull.len() < 3 {
        return Err(CalibrationError::DegenerateHull { points: hull.len() });
    }

    let mut mask = GrayImage::new(frame.width(), frame.height());
    draw_polygon_mut(&mut mask, &hull, Luma([255]));
    for _ in 0..params.dilate_iterations {
        mask = dilate(&mask, Norm::LInf, params.dilate_radius);
    }
    Ok(mask)
}

/// Per-pixel maximum of equally sized masks, blurred once with `blur_sigma`.
///
/// Returns `None` for an empty slice. Masks whose size differs from the first
/// one are skipped.
pub fn combine_masks(masks: &[GrayImage], blur_sigma: f32) -> Option<GrayImage> {
    let first = masks.first()?;
    let mut combined = first.clone();
    for mask in &masks[1..] {
        if mask.dimensions() != combined.dimensions() {
            log::warn!(
                "skipping mask of size {:?} (batch size {:?})",
                mask.dimensions(),
                combined.dimensions()
            );
            continue;
        }
        for (dst, src) in combined.pixels_mut().zip(mask.pixels()) {
            dst[0] = dst[0].max(src[0]);
        }
    }
    Some(blur(&combined, blur_sigma))
}
