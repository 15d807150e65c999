#![allow(dead_code)]

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;
use kbm_track::core::{homography_from_4pt, warp_perspective_rgb, Homography};
use kbm_track::{CropBounds, KbmTrackConfig, TemplateModel};
use nalgebra::Point2;

pub const PAD_W: u32 = 600;
pub const PAD_H: u32 = 500;

/// Where the template's corners appear in an 800×600 camera frame,
/// `[TL, TR, BR, BL]` in camera pixels.
pub const CAMERA_CORNERS: [(f32, f32); 4] =
    [(150.0, 100.0), (650.0, 120.0), (630.0, 500.0), (170.0, 480.0)];

/// Notch that hides the camera-side top-left corner.
const NOTCH: [(i32, i32); 3] = [(140, 90), (220, 103), (154, 170)];

/// Template asset: default scan margins around a light pad with two dark
/// buttons per row.
pub fn template_asset() -> RgbImage {
    let bounds = CropBounds::default();
    let mut img = RgbImage::from_pixel(
        PAD_W + bounds.left + bounds.right,
        PAD_H + bounds.top + bounds.bottom,
        Rgb([250, 250, 245]),
    );
    for row in 0..5 {
        let top = 3 + 98 * row;
        for x in [50, 300] {
            draw_filled_rect_mut(
                &mut img,
                Rect::at((bounds.left + x) as i32, top).of_size(120, 70),
                Rgb([20, 25, 30]),
            );
        }
    }
    img
}

pub fn pad() -> TemplateModel {
    TemplateModel::from_image(template_asset(), CropBounds::default()).expect("template")
}

/// Camera pixel → displayed template pixel for the synthetic camera pose.
pub fn true_out_from_img() -> Homography {
    let (w, h) = (PAD_W as f32, PAD_H as f32);
    let src = CAMERA_CORNERS.map(|(x, y)| Point2::new(x, y));
    let rect = [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ];
    homography_from_4pt(&src, &rect)
        .expect("homography")
        .then(&Homography::rotation_180(PAD_W, PAD_H))
}

/// Camera frame showing the pad upside down, with the notch and an optional
/// hand (dark disc).
pub fn camera_frame(hand: Option<(i32, i32)>) -> RgbImage {
    let mut frame = warp_perspective_rgb(pad().image(), &true_out_from_img(), 800, 600);
    let notch: Vec<Point<i32>> = NOTCH.iter().map(|&(x, y)| Point::new(x, y)).collect();
    draw_polygon_mut(&mut frame, &notch, Rgb([0, 0, 0]));
    if let Some(centre) = hand {
        draw_filled_circle_mut(&mut frame, centre, 50, Rgb([95, 75, 65]));
    }
    frame
}

/// Five frames, a hand covering a different corner in most of them.
pub fn calibration_frames() -> Vec<RgbImage> {
    [Some((650, 120)), None, Some((630, 500)), Some((170, 480)), None]
        .into_iter()
        .map(camera_frame)
        .collect()
}

/// Template, key map and config written to `dir`.
pub fn write_assets(dir: &Path) -> (PathBuf, KbmTrackConfig) {
    let template_path = dir.join("kbm_template.png");
    template_asset().save(&template_path).expect("write template");
    let keymap_path = dir.join("keyMappings.csv");
    std::fs::write(&keymap_path, "key,button\nKeyQ,A1\nKeyZ,\"E2\"\n").expect("write keymap");

    let cfg = KbmTrackConfig {
        template_path: template_path.to_string_lossy().into_owned(),
        keymap_path: Some(keymap_path.to_string_lossy().into_owned()),
        ..KbmTrackConfig::default()
    };
    let cfg_path = dir.join("kbm.json");
    cfg.write_json(&cfg_path).expect("write config");
    (cfg_path, cfg)
}
