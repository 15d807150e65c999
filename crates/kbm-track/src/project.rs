//! Rectification of live frames with the committed calibration.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use kbm_track_calib::{Calibration, CalibrationState};
use kbm_track_core::{warp_perspective_rgb, Homography};
use kbm_track_regions::{draw_region_overlay, KeyBindings, RegionGrid, RegionId};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Hand landmark indices of the five fingertips (thumb to little finger).
pub const FINGERTIP_INDICES: [usize; 5] = [4, 8, 12, 16, 20];

const POINT_RADIUS: i32 = 2;
const POINT_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Camera pixel → displayed template pixel.
///
/// The camera sees the template upside down, so the rectified view is turned
/// by 180° after the calibration homography.
fn out_from_img(calibration: &Calibration) -> Homography {
    calibration
        .matrix
        .then(&Homography::rotation_180(calibration.width, calibration.height))
}

/// Maps camera frames and points into template space.
///
/// Holds only the static region grid; the calibration is read from the
/// [`CalibrationState`] passed to each call, so the latest committed
/// calibration is always used.
#[derive(Clone, Debug, Default)]
pub struct ProjectionService {
    grid: RegionGrid,
}

impl ProjectionService {
    pub fn new(grid: RegionGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    /// Rectified, template-sized view of `frame`; `None` until calibrated.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn project(&self, state: &CalibrationState, frame: &RgbImage) -> Option<RgbImage> {
        let calibration = state.calibration()?;
        let Some(img_from_out) = out_from_img(calibration).inverse() else {
            log::warn!("calibration homography is singular, frame not projected");
            return None;
        };
        Some(warp_perspective_rgb(
            frame,
            &img_from_out,
            calibration.width,
            calibration.height,
        ))
    }

    /// `rectified` with the region grid outlined, one colour per row.
    pub fn draw_region_overlay(&self, rectified: &RgbImage) -> RgbImage {
        draw_region_overlay(rectified, &self.grid)
    }

    /// Camera pixel → rectified pixel; `None` until calibrated.
    pub fn map_point(&self, state: &CalibrationState, p_img: Point2<f32>) -> Option<Point2<f32>> {
        let calibration = state.calibration()?;
        let p = out_from_img(calibration).apply(p_img);
        (p.x.is_finite() && p.y.is_finite()).then_some(p)
    }

    /// Region under a camera pixel.
    pub fn region_at(&self, state: &CalibrationState, p_img: Point2<f32>) -> Option<RegionId> {
        self.grid.region_at(self.map_point(state, p_img)?)
    }

    /// Key code under a camera pixel.
    pub fn key_at<'a>(
        &self,
        state: &CalibrationState,
        bindings: &'a KeyBindings,
        p_img: Point2<f32>,
    ) -> Option<&'a str> {
        bindings.key_for(self.region_at(state, p_img)?)
    }
}

/// Copy of `frame` with a small filled dot at every point.
pub fn draw_points(frame: &RgbImage, points: &[Point2<f32>]) -> RgbImage {
    let mut out = frame.clone();
    for p in points {
        draw_filled_circle_mut(&mut out, (p.x as i32, p.y as i32), POINT_RADIUS, POINT_COLOR);
    }
    out
}

/// Fingertips of one hand in pixels.
///
/// `landmarks` are the hand detector's normalized `[0, 1]` coordinates;
/// missing fingertip indices are skipped.
pub fn fingertips_to_pixels(landmarks: &[Point2<f32>], width: u32, height: u32) -> Vec<Point2<f32>> {
    FINGERTIP_INDICES
        .iter()
        .filter_map(|&i| landmarks.get(i))
        .map(|p| {
            Point2::new(
                (p.x * width as f32).trunc(),
                (p.y * height as f32).trunc(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use kbm_track_core::Quad;
    use kbm_track_regions::{BoundingBox, RowLayout};

    fn calibrated(width: u32, height: u32) -> CalibrationState {
        // Template seen head-on and 2× smaller, upside down in the frame.
        let quad = Quad::new([
            Point2::new(10.0, 20.0),
            Point2::new(10.0 + width as f32 / 2.0, 20.0),
            Point2::new(10.0 + width as f32 / 2.0, 20.0 + height as f32 / 2.0),
            Point2::new(10.0, 20.0 + height as f32 / 2.0),
        ])
        .expect("quad");
        Calibration::from_corners(quad, width, height)
            .expect("calibration")
            .into()
    }

    #[test]
    fn nothing_is_projected_before_calibration() {
        let service = ProjectionService::default();
        let state = CalibrationState::new();
        let frame = RgbImage::new(64, 48);
        assert!(service.project(&state, &frame).is_none());
        assert!(service.map_point(&state, Point2::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn projection_rectifies_and_turns_the_view() {
        let state = calibrated(40, 20);
        let mut frame = RgbImage::from_pixel(80, 60, Rgb([0, 0, 0]));
        // Patch around the template's top-left corner in the camera frame.
        for y in 18..24 {
            for x in 8..14 {
                frame.put_pixel(x, y, Rgb([255, 0, 0]));
            }
        }

        let out = ProjectionService::default()
            .project(&state, &frame)
            .expect("calibrated");
        assert_eq!(out.dimensions(), (40, 20));
        // Camera top-left ends up bottom-right after the half turn.
        assert_eq!(out.get_pixel(39, 19), &Rgb([255, 0, 0]));
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 0]));
    }

    #[test]
    fn points_map_through_homography_and_half_turn() {
        let state = calibrated(40, 20);
        let service = ProjectionService::default();
        let p = service.map_point(&state, Point2::new(10.0, 20.0)).expect("mapped");
        assert_abs_diff_eq!(p.x, 40.0, epsilon = 1e-3);
        assert_abs_diff_eq!(p.y, 20.0, epsilon = 1e-3);
        let q = service.map_point(&state, Point2::new(25.0, 25.0)).expect("mapped");
        assert_abs_diff_eq!(q.x, 10.0, epsilon = 1e-3);
        assert_abs_diff_eq!(q.y, 10.0, epsilon = 1e-3);
    }

    #[test]
    fn camera_points_resolve_to_regions() {
        let state = calibrated(40, 20);
        let grid = RegionGrid::assign_rows(
            [BoundingBox {
                x: 5,
                y: 0,
                width: 10,
                height: 10,
            }],
            &RowLayout::new(20, 0.02),
        );
        let service = ProjectionService::new(grid);
        // (20, 27) → (20, 6), right of the box.
        assert_eq!(service.region_at(&state, Point2::new(20.0, 27.0)), None);
        // (26, 27) → (8, 6).
        assert_eq!(
            service.region_at(&state, Point2::new(26.0, 27.0)),
            Some(RegionId::new(0, 0))
        );
    }

    #[test]
    fn fingertips_are_scaled_to_pixels() {
        let mut hand = vec![Point2::new(0.0, 0.0); 21];
        hand[8] = Point2::new(0.5, 0.25);
        let tips = fingertips_to_pixels(&hand, 640, 480);
        assert_eq!(tips.len(), 5);
        assert_eq!(tips[1], Point2::new(320.0, 120.0));
        assert!(fingertips_to_pixels(&hand[..10], 640, 480).len() == 2);

        let dotted = draw_points(&RgbImage::new(20, 20), &[Point2::new(10.0, 10.0)]);
        assert_eq!(dotted.get_pixel(10, 10), &POINT_COLOR);
        assert_eq!(dotted.get_pixel(10, 13), &Rgb([0, 0, 0]));
    }
}
