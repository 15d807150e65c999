use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

/// Planar projective transform `p_dst ~ H * p_src`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    pub fn to_array(&self) -> [[f64; 3]; 3] {
        std::array::from_fn(|r| std::array::from_fn(|c| self.h[(r, c)]))
    }

    /// Half-turn of a `width × height` raster about its centre.
    ///
    /// Maps `(x, y)` to `(width - x, height - y)`, which sends pixel centres
    /// onto pixel centres of the rotated raster.
    pub fn rotation_180(width: u32, height: u32) -> Self {
        Self::new(Matrix3::new(
            -1.0,
            0.0,
            width as f64,
            0.0,
            -1.0,
            height as f64,
            0.0,
            0.0,
            1.0,
        ))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new((v[0] / v[2]) as f32, (v[1] / v[2]) as f32)
    }

    /// `self` followed by `next`.
    pub fn then(&self, next: &Homography) -> Self {
        Self::new(next.h * self.h)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().and_then(scale_to_unit).map(Self::new)
    }
}

fn scale_to_unit(h: Matrix3<f64>) -> Option<Matrix3<f64>> {
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(h / s)
}

/// Hartley conditioning: centroid at the origin, mean distance `sqrt(2)`.
fn conditioning<'a>(pts: impl Iterator<Item = &'a Point2<f32>> + Clone) -> Matrix3<f64> {
    let n = pts.clone().count().max(1) as f64;
    let (sx, sy) = pts
        .clone()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let (cx, cy) = (sx / n, sy / n);
    let mean_dist = pts
        .map(|p| ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;
    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn condition(t: &Matrix3<f64>, p: &Point2<f32>) -> (f64, f64) {
    let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
    (v[0], v[1])
}

fn uncondition(hn: Matrix3<f64>, t_src: Matrix3<f64>, t_dst: Matrix3<f64>) -> Option<Homography> {
    let t_dst_inv = t_dst.try_inverse()?;
    scale_to_unit(t_dst_inv * hn * t_src).map(Homography::new)
}

/// Exact homography from four correspondences, `dst ~ H * src`.
///
/// Solves the 8×8 system with `h33 = 1` on conditioned coordinates. Returns
/// `None` when three of the points are collinear.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let t_src = conditioning(src.iter());
    let t_dst = conditioning(dst.iter());

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for (k, (s, d)) in src.iter().zip(dst).enumerate() {
        let (x, y) = condition(&t_src, s);
        let (u, v) = condition(&t_dst, d);

        let r = 2 * k;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -u * x;
        a[(r, 7)] = -u * y;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -v * x;
        a[(r + 1, 7)] = -v * y;
        b[r + 1] = v;
    }

    let x = a.lu().solve(&b)?;
    let hn = Matrix3::new(x[0], x[1], x[2], x[3], x[4], x[5], x[6], x[7], 1.0);
    uncondition(hn, t_src, t_dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert_abs_diff_eq!(a.x, b.x, epsilon = tol);
        assert_abs_diff_eq!(a.y, b.y, epsilon = tol);
    }

    #[test]
    fn maps_skewed_quad_onto_template_rectangle() {
        let (w, h) = (800.0_f32, 600.0_f32);
        let corners = [
            Point2::new(212.0_f32, 143.0),
            Point2::new(1011.0, 171.0),
            Point2::new(968.0, 655.0),
            Point2::new(231.0, 612.0),
        ];
        let rect = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(w, 0.0),
            Point2::new(w, h),
            Point2::new(0.0, h),
        ];

        let hm = homography_from_4pt(&corners, &rect).expect("solvable");
        for (c, r) in corners.iter().zip(&rect) {
            assert_close(hm.apply(*c), *r, 1e-2);
        }

        let back = hm.inverse().expect("invertible");
        for (c, r) in corners.iter().zip(&rect) {
            assert_close(back.apply(*r), *c, 1e-2);
        }
    }

    #[test]
    fn rotation_then_rotation_is_identity() {
        let r = Homography::rotation_180(640, 480);
        assert_close(r.apply(Point2::new(0.5, 0.5)), Point2::new(639.5, 479.5), 1e-4);

        assert_eq!(r.to_array()[0], [-1.0, 0.0, 640.0]);
        assert_eq!(r.to_array()[1][2], 480.0);

        let twice = r.then(&r);
        assert_close(twice.apply(Point2::new(17.0, 301.0)), Point2::new(17.0, 301.0), 1e-4);
    }
}
