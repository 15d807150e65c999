//! Synthetic camera frames for unit tests.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_polygon_mut};
use imageproc::point::Point;
use imageproc::rect::Rect;

pub(crate) const BACKGROUND: u8 = 30;
pub(crate) const TEMPLATE: u8 = 220;
pub(crate) const HAND: u8 = 60;

/// Dark frame with one bright filled polygon.
pub(crate) fn frame_with_polygon(w: u32, h: u32, polygon: &[(i32, i32)]) -> RgbImage {
    let mut frame = RgbImage::from_pixel(w, h, Rgb([BACKGROUND; 3]));
    let pts: Vec<Point<i32>> = polygon.iter().map(|&(x, y)| Point::new(x, y)).collect();
    draw_polygon_mut(&mut frame, &pts, Rgb([TEMPLATE; 3]));
    frame
}

/// Paint a dark rectangle over `frame`, standing in for a hand.
pub(crate) fn occlude(frame: &mut RgbImage, x: i32, y: i32, w: u32, h: u32) {
    draw_filled_rect_mut(frame, Rect::at(x, y).of_size(w, h), Rgb([HAND; 3]));
}

/// Outline of the test template: a quad whose top-left corner is cut by a
/// 70 px chamfer, in a 640×480 frame.
pub(crate) const CHAMFERED: [(i32, i32); 5] =
    [(190, 102), (520, 110), (510, 380), (130, 370), (123, 170)];

/// True corners of [`CHAMFERED`], top-left first, clockwise.
pub(crate) const CHAMFERED_CORNERS: [(f32, f32); 4] =
    [(120.0, 100.0), (520.0, 110.0), (510.0, 380.0), (130.0, 370.0)];
