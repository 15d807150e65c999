use image::{Rgb, RgbImage};
use nalgebra::Point2;

use crate::Homography;

#[inline]
fn get_rgb(src: &RgbImage, x: i64, y: i64) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width() as i64 || y >= src.height() as i64 {
        return [0.0; 3];
    }
    let Rgb(c) = *src.get_pixel(x as u32, y as u32);
    [c[0] as f32, c[1] as f32, c[2] as f32]
}

/// Bilinear sample at continuous pixel coordinates (pixel centres at `i + 0.5`).
///
/// Samples outside the raster read as black.
pub fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let (x, y) = (x - 0.5, y - 0.5);
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    Rgb(std::array::from_fn(|c| {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8
    }))
}

/// Warp `src` into an `out_w × out_h` raster.
///
/// `h_img_from_out` maps output pixel centres back into the source frame.
pub fn warp_perspective_rgb(
    src: &RgbImage,
    h_img_from_out: &Homography,
    out_w: u32,
    out_h: u32,
) -> RgbImage {
    RgbImage::from_fn(out_w, out_h, |x, y| {
        let p = h_img_from_out.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
        if !p.x.is_finite() || !p.y.is_finite() {
            return Rgb([0, 0, 0]);
        }
        sample_bilinear_rgb(src, p.x, p.y)
    })
}
